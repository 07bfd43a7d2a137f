use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tracing::{debug, info};

use shared_backend::HospitalClient;
use shared_config::AppConfig;

use crate::models::{PaymentError, PaymentInfo, PaymentOutcome, PaymentReturnOutcome, PaymentReturnQuery};

/// Keeps gateway acknowledgements to one per order code. The flag flips
/// before the call goes out, matching the once-per-load guard the flow
/// requires; a failed acknowledgement is terminal, there is no retry.
#[derive(Debug, Default)]
pub struct ReconcileGuard {
    acknowledged: Mutex<HashSet<i64>>,
}

impl ReconcileGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per order code.
    pub fn first_ack(&self, order_code: i64) -> bool {
        let mut acknowledged = self
            .acknowledged
            .lock()
            .expect("reconcile guard lock poisoned");
        acknowledged.insert(order_code)
    }
}

pub struct ReconcileService {
    client: HospitalClient,
    guard: Arc<ReconcileGuard>,
}

impl ReconcileService {
    pub fn new(config: &AppConfig, guard: Arc<ReconcileGuard>) -> Self {
        Self {
            client: HospitalClient::new(config),
            guard,
        }
    }

    /// Process a gateway return: derive the bill, classify the outcome,
    /// acknowledge upstream at most once, then re-fetch the snapshot the
    /// result page renders. No derivable bill id is a dead end.
    pub async fn reconcile_return(
        &self,
        query: &PaymentReturnQuery,
    ) -> Result<PaymentReturnOutcome, PaymentError> {
        let raw = query.order_code.as_deref().unwrap_or("");
        let order_code: i64 = raw
            .trim()
            .parse()
            .map_err(|_| PaymentError::NoBillId(raw.to_string()))?;
        let bill_id = bill_id_from_order_code(order_code)
            .ok_or_else(|| PaymentError::NoBillId(raw.to_string()))?;

        let outcome = classify_return(query.status.as_deref(), query.cancel.as_deref());
        debug!(
            "Gateway return for order {} (bill {}): {:?}",
            order_code, bill_id, outcome
        );

        let acknowledged = match outcome {
            PaymentOutcome::Pending => false,
            PaymentOutcome::Success | PaymentOutcome::Cancelled => {
                if self.guard.first_ack(order_code) {
                    let action = if outcome == PaymentOutcome::Success {
                        "success"
                    } else {
                        "cancel"
                    };
                    let _: Value = self
                        .client
                        .post(
                            &format!("/transactions/{}/{}/", order_code, action),
                            None,
                            json!({}),
                        )
                        .await?;
                    info!("Acknowledged {} for order {}", action, order_code);
                    true
                } else {
                    false
                }
            }
        };

        let snapshot: PaymentInfo = self
            .client
            .get(&format!("/transactions/payment-info/{}/", order_code), None)
            .await?;

        Ok(PaymentReturnOutcome {
            outcome,
            bill_id,
            order_code,
            acknowledged,
            bill: snapshot.bill,
            appointment: snapshot.appointment,
        })
    }
}

/// `orderCode = billId * 1000 + sequence`; the backend owns this encoding.
pub fn bill_id_from_order_code(order_code: i64) -> Option<i64> {
    let bill_id = order_code / 1000;
    (bill_id > 0).then_some(bill_id)
}

pub fn classify_return(status: Option<&str>, cancel: Option<&str>) -> PaymentOutcome {
    let status = status.unwrap_or("");
    let cancel = cancel.unwrap_or("");

    if status == "PAID" && cancel == "false" {
        PaymentOutcome::Success
    } else if status == "CANCELLED" || cancel == "true" {
        PaymentOutcome::Cancelled
    } else {
        PaymentOutcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_code_divides_down_to_the_bill() {
        assert_eq!(bill_id_from_order_code(123045), Some(123));
        assert_eq!(bill_id_from_order_code(1000), Some(1));
    }

    #[test]
    fn short_order_codes_derive_nothing() {
        assert_eq!(bill_id_from_order_code(999), None);
        assert_eq!(bill_id_from_order_code(0), None);
        assert_eq!(bill_id_from_order_code(-5000), None);
    }

    #[test]
    fn paid_and_not_cancelled_is_success() {
        assert_eq!(
            classify_return(Some("PAID"), Some("false")),
            PaymentOutcome::Success
        );
    }

    #[test]
    fn cancelled_status_or_flag_is_cancelled() {
        assert_eq!(classify_return(Some("CANCELLED"), None), PaymentOutcome::Cancelled);
        assert_eq!(classify_return(Some("PAID"), Some("true")), PaymentOutcome::Cancelled);
        assert_eq!(classify_return(None, Some("true")), PaymentOutcome::Cancelled);
    }

    #[test]
    fn anything_else_stays_pending() {
        assert_eq!(classify_return(None, None), PaymentOutcome::Pending);
        assert_eq!(classify_return(Some("PAID"), None), PaymentOutcome::Pending);
        assert_eq!(classify_return(Some("PROCESSING"), Some("false")), PaymentOutcome::Pending);
    }

    #[test]
    fn guard_acknowledges_once_per_order() {
        let guard = ReconcileGuard::new();
        assert!(guard.first_ack(123045));
        assert!(!guard.first_ack(123045));
        assert!(guard.first_ack(124001));
    }
}
