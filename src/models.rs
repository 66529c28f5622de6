use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Storage format for due dates (YYYY-MM-DD)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for creation and completion timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    #[serde(alias = "dueDate")]
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    #[serde(alias = "createdAt", with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(
        default,
        alias = "completedAt",
        skip_serializing_if = "Option::is_none",
        with = "optional_timestamp"
    )]
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "Низкий")]
    Low,
    #[serde(alias = "Средний")]
    Medium,
    #[serde(alias = "Высокий")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(alias = "Активная")]
    Active,
    #[serde(alias = "Выполненная")]
    Completed,
    #[serde(alias = "Просроченная")]
    Overdue,
}

/// Which tasks a list view shows, matched against the effective status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl Task {
    pub fn new(
        id: u64,
        description: String,
        due_date: NaiveDate,
        priority: Priority,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            description,
            due_date,
            priority,
            status: Status::Active,
            created_at,
            completed_at: None,
        }
    }

    /// Status as it should be shown on `today`.
    ///
    /// A task stored as Active whose due date is strictly before `today` is
    /// Overdue. Every other task shows its stored status, so Completed is
    /// never demoted by the date.
    pub fn display_status(&self, today: NaiveDate) -> Status {
        if self.is_past_due(today) {
            Status::Overdue
        } else {
            self.status
        }
    }

    /// Stored Active and due before `today` (date-only comparison)
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == Status::Active && self.due_date < today
    }

    /// Set the stored status to Completed, stamping `completed_at` only the first time.
    /// Returns false if the task was already Completed.
    pub fn complete(&mut self, now: NaiveDateTime) -> bool {
        if self.status == Status::Completed {
            return false;
        }
        self.status = Status::Completed;
        self.completed_at.get_or_insert(now);
        true
    }
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Next value in Low -> Medium -> High -> Low order
    pub fn cycle(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Completed => "Completed",
            Status::Overdue => "Overdue",
        }
    }
}

impl StatusFilter {
    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
            StatusFilter::Overdue => "Overdue",
        }
    }

    /// Next filter in All -> Active -> Completed -> Overdue -> All order
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Overdue,
            StatusFilter::Overdue => StatusFilter::All,
        }
    }

    pub fn matches(&self, effective: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => effective == Status::Active,
            StatusFilter::Completed => effective == Status::Completed,
            StatusFilter::Overdue => effective == Status::Overdue,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}' (expected low, medium or high)", other)),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "completed" | "done" => Ok(Status::Completed),
            "overdue" => Ok(Status::Overdue),
            other => Err(format!("unknown status '{}' (expected active, completed or overdue)", other)),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(format!("unknown filter '{}' (expected all, active, completed or overdue)", other)),
        }
    }
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod optional_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.collect_str(&ts.format(TIMESTAMP_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
