use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub specialization: String,
    pub department_id: i64,
    pub department_name: Option<String>,
    pub price: f64,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Work shift markers as the backend encodes them: M = morning, A = afternoon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    #[serde(rename = "M")]
    Morning,
    #[serde(rename = "A")]
    Afternoon,
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Morning => write!(f, "M"),
            Shift::Afternoon => write!(f, "A"),
        }
    }
}

/// One working block of a doctor on a given date. Read-only for the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub doctor_id: i64,
    pub work_date: NaiveDate,
    pub shift: Shift,
    pub room: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Directory query: everything here is applied over the already-fetched
/// doctor list, not pushed to the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorQuery {
    pub q: Option<String>,
    pub specialization: Option<String>,
    pub department_id: Option<i64>,
    pub sort_by: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorPage {
    pub doctors: Vec<Doctor>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleQuery {
    pub work_date: NaiveDate,
}
