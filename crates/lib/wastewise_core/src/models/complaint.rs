//! Complaint domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review status set by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Accepted => "accepted",
            ComplaintStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComplaintStatus::Pending),
            "accepted" => Ok(ComplaintStatus::Accepted),
            "rejected" => Ok(ComplaintStatus::Rejected),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Work progress set by the area manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Progress {
    Recorded,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Progress {
    pub fn as_str(self) -> &'static str {
        match self {
            Progress::Recorded => "Recorded",
            Progress::InProgress => "In Progress",
            Progress::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Progress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Recorded" => Ok(Progress::Recorded),
            "In Progress" => Ok(Progress::InProgress),
            "Resolved" => Ok(Progress::Resolved),
            other => Err(format!("unknown progress '{other}'")),
        }
    }
}

/// Map coordinates picked by the citizen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Stored complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub username: String,
    /// Email of the principal that filed the complaint.
    pub email: String,
    pub description: String,
    pub location: GeoPoint,
    /// Area name used for manager scoping.
    pub area: String,
    pub waste_type: String,
    pub image: Option<String>,
    pub status: ComplaintStatus,
    pub progress: Progress,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. Status and progress start at their defaults.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub username: String,
    pub email: String,
    pub description: String,
    pub location: GeoPoint,
    pub area: String,
    pub waste_type: String,
    pub image: Option<String>,
}

/// Server-side complaint filter. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintFilter {
    pub email: Option<String>,
    pub area: Option<String>,
    pub status: Option<ComplaintStatus>,
}

impl ComplaintFilter {
    pub fn matches(&self, c: &Complaint) -> bool {
        self.email.as_deref().is_none_or(|e| e == c.email)
            && self.area.as_deref().is_none_or(|a| a == c.area)
            && self.status.is_none_or(|s| s == c.status)
    }
}

/// Per-area totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub area: String,
    pub total_complaints: i64,
    pub pending_complaints: i64,
    pub rejected_complaints: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ComplaintStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressCount {
    pub progress: Progress,
    pub count: i64,
}
