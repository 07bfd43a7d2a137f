use chrono::NaiveDate;
use tracing::debug;

use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::error::UpstreamError;

use crate::models::{Schedule, Shift};

pub struct ScheduleService {
    client: HospitalClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
        }
    }

    /// Schedule rows for one doctor on one date. An empty list is a normal
    /// answer, not an error.
    pub async fn schedules_for(
        &self,
        doctor_id: i64,
        work_date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Schedule>, UpstreamError> {
        debug!("Fetching schedules for doctor {} on {}", doctor_id, work_date);

        let path = format!(
            "/schedules/?doctor_id={}&work_date={}",
            doctor_id,
            urlencoding::encode(&work_date.to_string())
        );
        self.client.get(&path, Some(auth_token)).await
    }
}

/// Pick the schedule row for the requested shift, if any.
pub fn find_for_shift(schedules: &[Schedule], shift: Shift) -> Option<&Schedule> {
    schedules.iter().find(|s| s.shift == shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn schedule(id: i64, shift: Shift) -> Schedule {
        Schedule {
            id,
            doctor_id: 5,
            work_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            shift,
            room: Some("203".to_string()),
            building: Some("B".to_string()),
            floor: Some("2".to_string()),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        }
    }

    #[test]
    fn finds_the_row_for_the_requested_shift() {
        let rows = vec![schedule(1, Shift::Morning), schedule(2, Shift::Afternoon)];
        assert_eq!(find_for_shift(&rows, Shift::Afternoon).unwrap().id, 2);
    }

    #[test]
    fn missing_shift_yields_none() {
        let rows = vec![schedule(1, Shift::Morning)];
        assert!(find_for_shift(&rows, Shift::Afternoon).is_none());
    }

    #[test]
    fn shift_codes_round_trip() {
        let parsed: Shift = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(parsed, Shift::Morning);
        assert_eq!(serde_json::to_string(&Shift::Afternoon).unwrap(), "\"A\"");
    }
}
