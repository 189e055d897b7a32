use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Longest district name accepted at intake.
pub const DISTRICT_MAX_LEN: usize = 100;

/// An accepted date layout and where its year field sits.
///
/// chrono's `%Y` matches one to four digits; the year width is checked here.
struct DateInputFormat {
    pattern: &'static str,
    separator: char,
    year_field: usize,
    year_digits: usize,
}

impl DateInputFormat {
    fn parse(&self, value: &str) -> Option<NaiveDate> {
        let year = value.split(self.separator).nth(self.year_field)?;
        if year.len() != self.year_digits || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(value, self.pattern).ok()
    }
}

const DATE_INPUT_FORMATS: &[DateInputFormat] = &[
    DateInputFormat {
        pattern: "%Y-%m-%d",
        separator: '-',
        year_field: 0,
        year_digits: 4,
    },
    DateInputFormat {
        pattern: "%m/%d/%Y",
        separator: '/',
        year_field: 2,
        year_digits: 4,
    },
    DateInputFormat {
        pattern: "%m/%d/%y",
        separator: '/',
        year_field: 2,
        year_digits: 2,
    },
];

/// Store-assigned identifier for a job fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobFairId(pub i64);

impl fmt::Display for JobFairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated values for a record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobFair {
    pub district: String,
    pub fair_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A recruiting event at a district on a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFair {
    pub id: JobFairId,
    pub district: String,
    pub fair_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub qr_image: Option<Vec<u8>>,
}

impl JobFair {
    pub fn qr_status(&self) -> QrStatus {
        match &self.qr_image {
            Some(_) => QrStatus::Issued,
            None => QrStatus::Pending,
        }
    }

    /// Public path of the QR image, once one has been issued.
    pub fn qr_image_url(&self) -> Option<String> {
        self.qr_image.as_ref().map(|_| qr_image_url(self.id))
    }

    pub fn view(&self) -> JobFairView {
        JobFairView {
            id: self.id,
            district: self.district.clone(),
            fair_date: self.fair_date,
            created_at: self.created_at,
            qr_status: self.qr_status(),
            qr_image_url: self.qr_image_url(),
        }
    }
}

impl fmt::Display for JobFair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.district, self.fair_date)
    }
}

/// Whether the QR image has been attached to a record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QrStatus {
    Pending,
    Issued,
}

/// Serializable projection of a record, without the image bytes.
#[derive(Debug, Clone, Serialize)]
pub struct JobFairView {
    pub id: JobFairId,
    pub district: String,
    pub fair_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub qr_status: QrStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
}

/// Raw form fields as submitted by the placement team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFairForm {
    #[serde(default)]
    pub district: String,
    #[serde(rename = "job-fair-date", default)]
    pub fair_date: String,
}

/// Rejected form input. Raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("district is required")]
    EmptyDistrict,
    #[error("district must be at most {max} characters")]
    DistrictTooLong { max: usize },
    #[error("job fair date is required")]
    MissingDate,
    #[error("'{value}' is not a valid job fair date")]
    InvalidDate { value: String },
}

pub fn normalize_district(raw: &str) -> Result<String, ValidationError> {
    let district = raw.trim();
    if district.is_empty() {
        return Err(ValidationError::EmptyDistrict);
    }
    if district.chars().count() > DISTRICT_MAX_LEN {
        return Err(ValidationError::DistrictTooLong {
            max: DISTRICT_MAX_LEN,
        });
    }
    Ok(district.to_string())
}

/// Accepts ISO dates as well as US-style `MM/DD/YYYY` and `MM/DD/YY`.
pub fn parse_fair_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| format.parse(value))
        .ok_or_else(|| ValidationError::InvalidDate {
            value: value.to_string(),
        })
}

/// Text embedded in the QR symbol for a job fair.
pub fn qr_payload(id: JobFairId, registration_link: &str) -> String {
    format!("Job Fair ID: {id}, Link: {registration_link}")
}

pub fn qr_image_name(id: JobFairId) -> String {
    format!("qr_{id}.png")
}

pub fn qr_image_url(id: JobFairId) -> String {
    format!("/qr_codes/{}", qr_image_name(id))
}

/// Inverse of [`qr_image_name`]; `None` for anything else, including
/// signed or zero-padded ids.
pub fn parse_qr_image_name(name: &str) -> Option<JobFairId> {
    let digits = name.strip_prefix("qr_")?.strip_suffix(".png")?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(JobFairId)
}
