//! Dashboard statistics over the counseling log.
//!
//! The figures are recomputed from the full collection on every request.
//! There is no incremental bookkeeping; a single teacher's journal holds at
//! most a few hundred entries.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{CounselingLog, CounselingStatus, CounselingType};

/// Summary figures shown above the counseling table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Academic year label the figures are shown under.
    pub academic_year: String,
    /// Number of logs.
    pub total: usize,
    /// Logs whose status is `butuh bantuan`.
    pub needs_help: usize,
    /// Logs dated on the current day.
    pub today: usize,
    /// Individual sessions.
    pub individual: usize,
    /// Classical sessions.
    pub klasikal: usize,
}

impl DashboardStats {
    /// Derive the dashboard figures.
    ///
    /// `today` is the current calendar day; it is a parameter so the result
    /// depends only on the inputs.
    #[must_use]
    pub fn derive(logs: &[CounselingLog], academic_year: &str, today: NaiveDate) -> Self {
        let mut stats = Self {
            academic_year: academic_year.to_string(),
            total: logs.len(),
            needs_help: 0,
            today: 0,
            individual: 0,
            klasikal: 0,
        };

        for log in logs {
            if log.status == CounselingStatus::ButuhBantuan {
                stats.needs_help += 1;
            }
            if log.date == today {
                stats.today += 1;
            }
            match log.counseling_type {
                CounselingType::Individual => stats.individual += 1,
                CounselingType::Klasikal => stats.klasikal += 1,
            }
        }

        stats
    }
}

/// Number of logs with status `butuh bantuan`.
#[must_use]
pub fn count_needs_help(logs: &[CounselingLog]) -> usize {
    logs.iter()
        .filter(|l| l.status == CounselingStatus::ButuhBantuan)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogId, NewCounselingLog, NewStudent, Student, StudentId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn log(n: usize, date: NaiveDate, status: CounselingStatus, ty: CounselingType) -> CounselingLog {
        let student = Student::from_new(
            StudentId::from("s-1"),
            NewStudent {
                name: "Ani".to_string(),
                class_name: "X-1".to_string(),
                ..NewStudent::default()
            },
        );
        let mut entry = NewCounselingLog::new(student.id.clone(), date, "2024/2025");
        entry.status = status;
        entry.counseling_type = ty;
        CounselingLog::record(LogId::from(format!("l-{n}")), entry, &student)
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let stats = DashboardStats::derive(&[], "2024/2025", day(10));
        assert_eq!(
            stats,
            DashboardStats {
                academic_year: "2024/2025".to_string(),
                total: 0,
                needs_help: 0,
                today: 0,
                individual: 0,
                klasikal: 0,
            }
        );
    }

    #[test]
    fn test_needs_help_counts_only_butuh_bantuan() {
        let logs = vec![
            log(1, day(1), CounselingStatus::Baik, CounselingType::Individual),
            log(2, day(1), CounselingStatus::ButuhBantuan, CounselingType::Individual),
            log(3, day(2), CounselingStatus::ButuhBantuan, CounselingType::Klasikal),
        ];
        assert_eq!(count_needs_help(&logs), 2);
        assert_eq!(DashboardStats::derive(&logs, "2024/2025", day(9)).needs_help, 2);
    }

    #[test]
    fn test_perlu_perhatian_is_not_needs_help() {
        let logs = vec![log(
            1,
            day(1),
            CounselingStatus::PerluPerhatian,
            CounselingType::Individual,
        )];
        assert_eq!(count_needs_help(&logs), 0);
    }

    #[test]
    fn test_daily_count_matches_today_only() {
        let logs = vec![
            log(1, day(10), CounselingStatus::Baik, CounselingType::Individual),
            log(2, day(9), CounselingStatus::Baik, CounselingType::Individual),
        ];
        let stats = DashboardStats::derive(&logs, "2024/2025", day(10));
        assert_eq!(stats.today, 1);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_type_split_sums_to_total() {
        let logs = vec![
            log(1, day(1), CounselingStatus::Baik, CounselingType::Individual),
            log(2, day(2), CounselingStatus::Baik, CounselingType::Klasikal),
            log(3, day(3), CounselingStatus::Baik, CounselingType::Individual),
        ];
        let stats = DashboardStats::derive(&logs, "2024/2025", day(30));
        assert_eq!(stats.individual, 2);
        assert_eq!(stats.klasikal, 1);
        assert_eq!(stats.individual + stats.klasikal, stats.total);
    }

    #[test]
    fn test_derive_is_repeatable() {
        let logs = vec![log(1, day(1), CounselingStatus::ButuhBantuan, CounselingType::Klasikal)];
        let a = DashboardStats::derive(&logs, "2024/2025", day(1));
        let b = DashboardStats::derive(&logs, "2024/2025", day(1));
        assert_eq!(a, b);
    }
}
