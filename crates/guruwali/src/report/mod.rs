//! Word-compatible report export.
//!
//! A report is an HTML page carrying the Office namespaces, saved with a `.doc`
//! extension and a leading byte-order mark so that Word opens it with the
//! right encoding.

pub mod escape;
pub mod filename;
pub mod html;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::TypeFilter;
use crate::model::{CounselingLog, Student};

use html::{ReportHeader, ReportTable};

/// MIME type of exported documents.
pub const MIME_TYPE: &str = "application/msword";

/// Byte-order mark written before the document body.
pub const BOM: char = '\u{feff}';

const STUDENT_TITLE: &str = "Daftar Siswa Bimbingan";
const STUDENT_PREFIX: &str = "Daftar_Siswa";
const JOURNAL_DOCUMENT_TITLE: &str = "Jurnal Bimbingan";
const JOURNAL_TITLE: &str = "Jurnal Bimbingan Guru Wali";
const JOURNAL_PREFIX: &str = "Jurnal_Bimbingan";

/// A rendered report ready to be saved or handed to a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Suggested file name.
    pub filename: String,
    /// HTML markup, without the byte-order mark.
    pub body: String,
    /// Number of data rows in the table.
    pub rows: usize,
}

impl ReportDocument {
    /// MIME type of the document.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// Encoded document: byte-order mark followed by the UTF-8 body.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.body.len() + BOM.len_utf8());
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(BOM.encode_utf8(&mut buf).as_bytes());
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    /// Write the document into `dir` under its file name, creating the
    /// directory if needed. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(&self.filename);
        fs::write(&path, self.bytes()).map_err(|source| Error::ReportWrite {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), bytes = self.body.len(), "saved report");
        Ok(path)
    }
}

/// Render the student roster report.
#[must_use]
pub fn student_report(students: &[Student], config: &Config, today: NaiveDate) -> ReportDocument {
    let header = ReportHeader {
        document_title: STUDENT_TITLE,
        title: STUDENT_TITLE,
        teacher: &config.teacher,
        academic_year: &config.academic_year,
        category: None,
    };
    let table = ReportTable::from_records(students);

    ReportDocument {
        filename: filename::report_filename(STUDENT_PREFIX, None, today, &config.report.date_format),
        body: html::render_report(&header, &table, escape::policy(config.report.escape_text)),
        rows: table.len(),
    }
}

/// Render the counseling journal report for the logs selected by `filter`.
///
/// `logs` is expected to already be filtered; `filter` supplies the category
/// line and the file name label.
#[must_use]
pub fn counseling_report<'a, I>(
    logs: I,
    filter: TypeFilter,
    config: &Config,
    today: NaiveDate,
) -> ReportDocument
where
    I: IntoIterator<Item = &'a CounselingLog>,
{
    let label = filter.label();
    let header = ReportHeader {
        document_title: JOURNAL_DOCUMENT_TITLE,
        title: JOURNAL_TITLE,
        teacher: &config.teacher,
        academic_year: &config.academic_year,
        category: Some(label),
    };
    let table = ReportTable::from_records(logs);

    ReportDocument {
        filename: filename::report_filename(
            JOURNAL_PREFIX,
            Some(label),
            today,
            &config.report.date_format,
        ),
        body: html::render_report(&header, &table, escape::policy(config.report.escape_text)),
        rows: table.len(),
    }
}
