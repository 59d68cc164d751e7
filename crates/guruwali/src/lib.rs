//! `guruwali` - Counseling journal for homeroom teachers
//!
//! This library keeps a student roster and an append-only log of counseling
//! sessions, derives dashboard statistics from the log, and exports both
//! collections as Word-compatible report documents.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod journal;
pub mod logging;
pub mod model;
pub mod report;
pub mod stats;
pub mod storage;

pub use config::{Config, TeacherData};
pub use error::{Error, Result};
pub use filter::{filter_logs, FilteredLogs, TypeFilter};
pub use journal::{Journal, JournalSnapshot};
pub use logging::init_logging;
pub use model::{
    CounselingAspect, CounselingLog, CounselingStatus, CounselingType, LogId, NewCounselingLog,
    NewStudent, Student, StudentId, StudentSnapshot,
};
pub use report::{counseling_report, student_report, ReportDocument};
pub use stats::DashboardStats;
pub use storage::{Storage, StorageCounts};
