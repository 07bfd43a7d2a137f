use std::sync::atomic::{AtomicU64, Ordering};

/// Generation stamp for refreshes of the same resource. `begin` hands out a
/// monotonically increasing ticket; `try_apply` accepts a result only while
/// its ticket is still the newest issued and nothing newer has been applied,
/// so a superseded in-flight response can never overwrite fresher state.
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn try_apply(&self, ticket: u64) -> bool {
        if ticket != self.issued.load(Ordering::Acquire) {
            return false;
        }

        let mut current = self.applied.load(Ordering::Acquire);
        loop {
            if ticket <= current {
                return false;
            }
            match self.applied.compare_exchange(
                current,
                ticket,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_refresh_applies() {
        let seq = RequestSequence::new();
        let ticket = seq.begin();
        assert!(seq.try_apply(ticket));
    }

    #[test]
    fn superseded_refresh_is_dropped() {
        let seq = RequestSequence::new();
        let first = seq.begin();
        let second = seq.begin();

        // The older in-flight response arrives late and must not be applied.
        assert!(seq.try_apply(second));
        assert!(!seq.try_apply(first));
    }

    #[test]
    fn stale_ticket_is_dropped_even_before_newest_applies() {
        let seq = RequestSequence::new();
        let first = seq.begin();
        let _second = seq.begin();

        assert!(!seq.try_apply(first));
    }

    #[test]
    fn same_ticket_applies_once() {
        let seq = RequestSequence::new();
        let ticket = seq.begin();
        assert!(seq.try_apply(ticket));
        assert!(!seq.try_apply(ticket));
    }
}
