use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub join_date: NaiveDate,
    pub prescriptions_issued: u32,
}

impl DoctorRecord {
    pub fn new(id: u32, name: &str, specialty: &str, join_date: NaiveDate, prescriptions_issued: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            specialty: specialty.to_string(),
            join_date,
            prescriptions_issued,
        }
    }

    /// Join date as shown on the doctor card, e.g. `May 15, 2021`.
    pub fn join_date_display(&self) -> String {
        self.join_date.format("%B %d, %Y").to_string()
    }

    /// Case-insensitive substring match on name or specialty.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.specialty.to_lowercase().contains(needle)
    }
}

/// Card view handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCard {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub join_date: NaiveDate,
    pub join_date_display: String,
    pub prescriptions_issued: u32,
    pub booking: BookingState,
    pub booking_label: String,
}

impl DoctorCard {
    pub fn from_record(record: &DoctorRecord, booking: BookingState) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            specialty: record.specialty.clone(),
            join_date: record.join_date,
            join_date_display: record.join_date_display(),
            prescriptions_issued: record.prescriptions_issued,
            booking,
            booking_label: booking.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    #[default]
    Idle,
    Pending,
}

impl BookingState {
    pub fn label(&self) -> &'static str {
        match self {
            BookingState::Idle => "Book Appointment now",
            BookingState::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub problem: String,
}

/// Body returned by the recommendation service. `doctors` may be missing or null.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub doctors: Option<Vec<String>>,
}

/// How a recommendation call ended, as seen by the search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "query", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    /// The service suggested this specialty.
    Suggested(String),
    /// The service answered without suggestions, the configured fallback was used.
    Fallback(String),
    /// The call failed, the query was left untouched.
    Unchanged,
    /// The session was closed before the answer arrived.
    Discarded,
}

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Recommendation service unreachable: {0}")]
    Network(String),

    #[error("Recommendation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed recommendation response: {0}")]
    MalformedResponse(String),

    #[error("Invalid recommendation service URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RecommendationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RecommendationError::MalformedResponse(err.to_string())
        } else {
            RecommendationError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DoctorError {
    #[error("Doctor not found: {0}")]
    NotFound(u32),
}
