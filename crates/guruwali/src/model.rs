//! Core record types for guruwali.
//!
//! This module defines the student roster entry, the counseling log entry and
//! the fixed category sets a log is classified by. Serialized field names
//! follow the camelCase shape of the journal's JSON backups.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of a student. Assigned at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

/// Identifier of a counseling log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(String);

macro_rules! impl_record_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

impl_record_id!(StudentId);
impl_record_id!(LogId);

/// Strip everything but alphanumerics and lowercase the rest, so that
/// `"Sosial-Emosional"`, `"sosial emosional"` and `"SOSIAL_EMOSIONAL"` compare equal.
fn normalize_label(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Session format of a counseling log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounselingType {
    /// One-on-one session.
    Individual,
    /// Classical (whole-group) session.
    Klasikal,
}

impl CounselingType {
    /// Every session type, in display order.
    pub const ALL: [Self; 2] = [Self::Individual, Self::Klasikal];

    /// The label used in forms and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Klasikal => "Klasikal",
        }
    }
}

/// Dimension of student development a session addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounselingAspect {
    /// Academic progress.
    Akademik,
    /// Character building.
    Karakter,
    /// Social and emotional wellbeing.
    #[serde(rename = "Sosial-Emosional")]
    SosialEmosional,
    /// Discipline.
    Kedisiplinan,
    /// Talents and interests.
    #[serde(rename = "Bakat dan Minat")]
    BakatDanMinat,
}

impl CounselingAspect {
    /// Every aspect, in display order.
    pub const ALL: [Self; 5] = [
        Self::Akademik,
        Self::Karakter,
        Self::SosialEmosional,
        Self::Kedisiplinan,
        Self::BakatDanMinat,
    ];

    /// The label used in forms and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Akademik => "Akademik",
            Self::Karakter => "Karakter",
            Self::SosialEmosional => "Sosial-Emosional",
            Self::Kedisiplinan => "Kedisiplinan",
            Self::BakatDanMinat => "Bakat dan Minat",
        }
    }
}

/// Outcome severity of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounselingStatus {
    /// The student is doing well.
    #[serde(rename = "baik")]
    Baik,
    /// The student needs attention.
    #[serde(rename = "perlu perhatian")]
    PerluPerhatian,
    /// The student needs help; counted on the dashboard.
    #[serde(rename = "butuh bantuan")]
    ButuhBantuan,
}

impl CounselingStatus {
    /// Every status, from least to most severe.
    pub const ALL: [Self; 3] = [Self::Baik, Self::PerluPerhatian, Self::ButuhBantuan];

    /// The stored/displayed label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Baik => "baik",
            Self::PerluPerhatian => "perlu perhatian",
            Self::ButuhBantuan => "butuh bantuan",
        }
    }
}

macro_rules! impl_label_enum {
    ($name:ident, $field:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.label())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize_label(s);
                Self::ALL
                    .into_iter()
                    .find(|v| normalize_label(v.label()) == wanted)
                    .ok_or_else(|| {
                        let expected = Self::ALL
                            .iter()
                            .map(|v| v.label())
                            .collect::<Vec<_>>()
                            .join(", ");
                        Error::invalid_value($field, s, expected)
                    })
            }
        }
    };
}

impl_label_enum!(CounselingType, "counseling type");
impl_label_enum!(CounselingAspect, "aspect");
impl_label_enum!(CounselingStatus, "status");

/// A student on the teacher's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Stable identifier.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Class the student belongs to, e.g. `"XI IPA 2"`.
    pub class_name: String,
    /// Home address.
    #[serde(default)]
    pub address: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Photo as embeddable image data (for example a `data:` URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Field values for creating or editing a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    /// Full name.
    pub name: String,
    /// Class name.
    pub class_name: String,
    /// Home address.
    pub address: String,
    /// Phone number.
    pub phone: String,
    /// Free-text notes.
    pub notes: String,
    /// Optional photo data.
    pub photo: Option<String>,
}

impl Student {
    /// Build a student from form values under the given id.
    #[must_use]
    pub fn from_new(id: StudentId, fields: NewStudent) -> Self {
        Self {
            id,
            name: fields.name,
            class_name: fields.class_name,
            address: fields.address,
            phone: fields.phone,
            notes: fields.notes,
            photo: fields.photo.filter(|p| !p.is_empty()),
        }
    }

    /// The snapshot a new counseling log captures from this student.
    #[must_use]
    pub fn snapshot(&self) -> StudentSnapshot {
        StudentSnapshot {
            student_name: self.name.clone(),
            class_name: self.class_name.clone(),
        }
    }
}

impl From<&Student> for NewStudent {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            class_name: student.class_name.clone(),
            address: student.address.clone(),
            phone: student.phone.clone(),
            notes: student.notes.clone(),
            photo: student.photo.clone(),
        }
    }
}

/// Student name and class as they were when a log was recorded.
///
/// Deliberately not kept in sync with the roster: renaming a student or moving
/// them to another class leaves earlier logs showing the old values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
    /// Student name at time of entry.
    pub student_name: String,
    /// Class name at time of entry.
    pub class_name: String,
}

/// One recorded counseling session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselingLog {
    /// Stable identifier.
    pub id: LogId,
    /// The counseled student.
    pub student_id: StudentId,
    /// Name and class of the student at time of entry.
    #[serde(flatten)]
    pub student: StudentSnapshot,
    /// Session date.
    pub date: NaiveDate,
    /// Session start.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Session end.
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Academic year label, e.g. `"2024/2025"`.
    pub academic_year: String,
    /// Individual or classical session.
    #[serde(rename = "type")]
    pub counseling_type: CounselingType,
    /// Development aspect addressed.
    pub aspect: CounselingAspect,
    /// Narrative of the session outcome.
    pub result: String,
    /// Outcome severity.
    pub status: CounselingStatus,
    /// Agreed follow-up action.
    pub follow_up: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Field values submitted for a new counseling log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCounselingLog {
    /// The student being counseled; must exist on the roster.
    pub student_id: StudentId,
    /// Session date.
    pub date: NaiveDate,
    /// Session start.
    pub start_time: NaiveTime,
    /// Session end.
    pub end_time: NaiveTime,
    /// Academic year label.
    pub academic_year: String,
    /// Session format.
    pub counseling_type: CounselingType,
    /// Development aspect.
    pub aspect: CounselingAspect,
    /// Outcome narrative.
    pub result: String,
    /// Outcome severity.
    pub status: CounselingStatus,
    /// Follow-up action.
    pub follow_up: String,
    /// Notes.
    pub notes: String,
}

impl NewCounselingLog {
    /// A submission pre-filled the way the input form starts out:
    /// individual session, academic aspect, status `baik`.
    ///
    /// The form has no default session times. Both start at midnight here and
    /// callers are expected to set them; the CLI requires `--start` and `--end`.
    #[must_use]
    pub fn new(student_id: StudentId, date: NaiveDate, academic_year: impl Into<String>) -> Self {
        Self {
            student_id,
            date,
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            academic_year: academic_year.into(),
            counseling_type: CounselingType::Individual,
            aspect: CounselingAspect::Akademik,
            result: String::new(),
            status: CounselingStatus::Baik,
            follow_up: String::new(),
            notes: String::new(),
        }
    }
}

impl CounselingLog {
    /// Record a submission, copying the student's current name and class.
    #[must_use]
    pub fn record(id: LogId, entry: NewCounselingLog, student: &Student) -> Self {
        Self {
            id,
            student_id: entry.student_id,
            student: student.snapshot(),
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            academic_year: entry.academic_year,
            counseling_type: entry.counseling_type,
            aspect: entry.aspect,
            result: entry.result,
            status: entry.status,
            follow_up: entry.follow_up,
            notes: entry.notes,
        }
    }

    /// Session time span as `HH:MM - HH:MM`.
    #[must_use]
    pub fn time_span(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format(hhmm::FORMAT),
            self.end_time.format(hhmm::FORMAT)
        )
    }
}

/// Parse a session time given as `HH:MM` (seconds are accepted and kept).
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] if the input is not a valid time.
pub fn parse_time(field: &'static str, input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), hhmm::FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(input.trim(), "%H:%M:%S"))
        .map_err(|_| Error::invalid_value(field, input, "a time as HH:MM"))
}

/// Parse a session date given as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] if the input is not a valid date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::invalid_value("date", input, "a date as YYYY-MM-DD"))
}

/// `HH:MM` (de)serialization for session times. Non-zero seconds are written
/// as `HH:MM:SS` so they survive a round trip.
mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";
    pub const FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 {
            FORMAT
        } else {
            FORMAT_WITH_SECONDS
        };
        serializer.collect_str(&time.format(format))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time("time", &raw).map_err(serde::de::Error::custom)
    }
}
