use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde_json::json;
use tracing::debug;

use doctor_cell::models::Shift;
use doctor_cell::services::schedule::{find_for_shift, ScheduleService};
use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::error::UpstreamError;
use shared_utils::latest::RequestSequence;

use crate::models::{AvailabilityQuery, DayAvailability, SlotInfo, SlotMark};

type BoardKey = (i64, NaiveDate, Shift);

/// Latest-only cache of resolved availability per (doctor, date, shift).
/// Concurrent refreshes of the same key are generation-stamped so a
/// superseded upstream response never overwrites a newer snapshot.
#[derive(Default)]
pub struct AvailabilityBoard {
    entries: RwLock<HashMap<BoardKey, BoardEntry>>,
}

#[derive(Default)]
struct BoardEntry {
    sequence: Arc<RequestSequence>,
    snapshot: Option<DayAvailability>,
}

impl AvailabilityBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn sequence(&self, key: &BoardKey) -> Arc<RequestSequence> {
        let mut entries = self
            .entries
            .write()
            .expect("availability board lock poisoned");
        Arc::clone(&entries.entry(*key).or_default().sequence)
    }

    /// Store the freshly resolved day if its ticket is still current,
    /// otherwise hand back the snapshot the newer refresh already stored.
    fn apply(&self, key: &BoardKey, ticket: u64, day: DayAvailability) -> DayAvailability {
        let mut entries = self
            .entries
            .write()
            .expect("availability board lock poisoned");
        let entry = entries.entry(*key).or_default();

        if entry.sequence.try_apply(ticket) {
            entry.snapshot = Some(day.clone());
            day
        } else {
            entry.snapshot.clone().unwrap_or(day)
        }
    }
}

pub struct SlotResolver {
    client: HospitalClient,
    schedules: ScheduleService,
    board: Arc<AvailabilityBoard>,
}

impl SlotResolver {
    pub fn new(config: &AppConfig, board: Arc<AvailabilityBoard>) -> Self {
        Self {
            client: HospitalClient::new(config),
            schedules: ScheduleService::new(config),
            board,
        }
    }

    /// Resolve the bookable slots for one doctor-day. No schedule rows, or
    /// none for the requested shift, yields empty buckets rather than an
    /// error.
    pub async fn resolve(
        &self,
        query: &AvailabilityQuery,
        auth_token: &str,
    ) -> Result<DayAvailability, UpstreamError> {
        let key = (query.doctor_id, query.date, query.shift);
        let sequence = self.board.sequence(&key);
        let ticket = sequence.begin();

        let schedules = self
            .schedules
            .schedules_for(query.doctor_id, query.date, auth_token)
            .await?;

        let day = match find_for_shift(&schedules, query.shift) {
            None => {
                debug!(
                    "No {} schedule for doctor {} on {}",
                    query.shift, query.doctor_id, query.date
                );
                DayAvailability::default()
            }
            Some(schedule) => {
                let slots: Vec<SlotInfo> = self
                    .client
                    .post(
                        "/appointments/schedule/available-slots/",
                        Some(auth_token),
                        json!({ "schedule_id": schedule.id }),
                    )
                    .await?;

                build_day(slots, query.date, query.selected, Utc::now())
            }
        };

        Ok(self.board.apply(&key, ticket, day))
    }
}

/// Bucket and tag a slot list for presentation.
pub fn build_day(
    slots: Vec<SlotInfo>,
    date: NaiveDate,
    previous_selection: Option<NaiveTime>,
    now: DateTime<Utc>,
) -> DayAvailability {
    let selection = retain_selection(previous_selection, &slots);

    let mut morning = Vec::new();
    let mut afternoon = Vec::new();

    for slot in slots {
        let mark = SlotMark {
            selectable: is_selectable(slot.slot_start, date, now),
            slot_start: slot.slot_start,
            slot_end: slot.slot_end,
            available: slot.available,
        };

        if is_morning(mark.slot_start) {
            morning.push(mark);
        } else {
            afternoon.push(mark);
        }
    }

    DayAvailability {
        morning,
        afternoon,
        selection,
    }
}

pub fn is_morning(slot_start: NaiveTime) -> bool {
    slot_start.hour() < 12
}

/// Past slots are only disabled on the same day; the date itself being in
/// the past or future is the booking validation's concern.
pub fn is_selectable(slot_start: NaiveTime, date: NaiveDate, now: DateTime<Utc>) -> bool {
    date != now.date_naive() || slot_start > now.time()
}

/// Keep the previous selection only while the refreshed list still offers it.
pub fn retain_selection(
    previous: Option<NaiveTime>,
    slots: &[SlotInfo],
) -> Option<NaiveTime> {
    previous.filter(|t| slots.iter().any(|s| s.slot_start == *t))
}
