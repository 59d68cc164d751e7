//! Session-type filtering of the counseling log.
//!
//! [`filter_logs`] is the pure selection. [`FilteredLogs`] memoizes it against
//! the journal revision so that repeated renders with unchanged inputs reuse
//! the previous selection.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::model::{CounselingLog, CounselingType};

/// Label of the "show everything" filter option.
pub const ALL_LABEL: &str = "Individual & Klasikal";

/// Which session types to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeFilter {
    /// Every log.
    #[default]
    All,
    /// Only logs of one session type.
    Only(CounselingType),
}

impl TypeFilter {
    /// Whether a log passes this filter.
    #[must_use]
    pub fn matches(self, log: &CounselingLog) -> bool {
        match self {
            Self::All => true,
            Self::Only(ty) => log.counseling_type == ty,
        }
    }

    /// The label shown in the UI and printed as the report category.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => ALL_LABEL,
            Self::Only(ty) => ty.label(),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<CounselingType> for TypeFilter {
    fn from(ty: CounselingType) -> Self {
        Self::Only(ty)
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all")
            || trimmed.eq_ignore_ascii_case("semua")
            || trimmed.eq_ignore_ascii_case(ALL_LABEL)
        {
            return Ok(Self::All);
        }
        trimmed
            .parse::<CounselingType>()
            .map(Self::Only)
            .map_err(|_| Error::invalid_value("filter", s, "all, Individual, Klasikal"))
    }
}

/// Select the logs passing `filter`, keeping their original order.
#[must_use]
pub fn filter_logs(logs: &[CounselingLog], filter: TypeFilter) -> Vec<&CounselingLog> {
    logs.iter().filter(|log| filter.matches(log)).collect()
}

/// Memoized filter selection.
///
/// The selection is recomputed only when the journal (its instance or
/// revision) or the filter differs from the previous call.
#[derive(Debug, Default)]
pub struct FilteredLogs {
    key: Option<(u64, u64, TypeFilter)>,
    indices: Vec<usize>,
    recomputations: usize,
}

impl FilteredLogs {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions (into `journal.logs()`) of the logs passing `filter`.
    pub fn indices(&mut self, journal: &Journal, filter: TypeFilter) -> &[usize] {
        let key = (journal.instance(), journal.revision(), filter);
        if self.key != Some(key) {
            self.indices = journal
                .logs()
                .iter()
                .enumerate()
                .filter(|(_, log)| filter.matches(log))
                .map(|(i, _)| i)
                .collect();
            self.key = Some(key);
            self.recomputations += 1;
            trace!(
                instance = key.0,
                revision = key.1,
                filter = %filter,
                selected = self.indices.len(),
                "recomputed log filter"
            );
        }
        &self.indices
    }

    /// The logs passing `filter`, in journal order.
    pub fn select<'a>(&mut self, journal: &'a Journal, filter: TypeFilter) -> Vec<&'a CounselingLog> {
        let logs = journal.logs();
        self.indices(journal, filter)
            .iter()
            .filter_map(|&i| logs.get(i))
            .collect()
    }

    /// How many times the selection has been computed.
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}
