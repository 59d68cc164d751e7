//! Storage layer for guruwali.
//!
//! This module provides `SQLite`-based persistent storage for the student
//! roster and the counseling log. Records are loaded into a [`Journal`] in the
//! order they were added and can be written back either in one transaction or
//! one record at a time.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::model::{
    parse_date, parse_time, CounselingAspect, CounselingLog, CounselingStatus, CounselingType,
    Student, StudentId, StudentSnapshot,
};

/// Format of stored session times. Seconds are kept when present.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Format of stored session dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

const STUDENT_COLUMNS: &str = "id, name, class_name, address, phone, notes, photo";

const LOG_COLUMNS: &str = "id, student_id, student_name, class_name, date, start_time, end_time, \
                           academic_year, counseling_type, aspect, result, status, follow_up, notes";

/// Storage engine for the journal.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Record counts and file size of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageCounts {
    /// Number of students on the roster.
    pub students: i64,
    /// Number of counseling logs.
    pub logs: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl Storage {
    /// Open or create a journal database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole journal, keeping roster and log order.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row cannot be decoded.
    pub fn load_journal(&self) -> Result<Journal> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY position ASC"
        ))?;
        let students = stmt
            .query_map([], Self::row_to_student)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM counseling_logs ORDER BY position ASC"
        ))?;
        let logs = stmt
            .query_map([], LogRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(LogRow::decode)
            .collect::<Result<Vec<_>>>()?;

        debug!(students = students.len(), logs = logs.len(), "loaded journal");
        Journal::from_parts(students, logs)
    }

    /// Replace the stored journal with `journal` in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the stored data is left
    /// unchanged in that case.
    pub fn save_journal(&mut self, journal: &Journal) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM counseling_logs", [])?;
        tx.execute("DELETE FROM students", [])?;

        for (position, student) in journal.students().iter().enumerate() {
            write_student(&tx, to_position(position), student)?;
        }
        for (position, log) in journal.logs().iter().enumerate() {
            write_log(&tx, to_position(position), log)?;
        }

        tx.commit()?;
        info!(
            students = journal.students().len(),
            logs = journal.logs().len(),
            "saved journal"
        );
        Ok(())
    }

    /// Append a student after the existing roster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is already stored, or an error
    /// if the database operation fails.
    pub fn insert_student(&self, student: &Student) -> Result<()> {
        if self.exists("students", student.id.as_str())? {
            return Err(Error::DuplicateId {
                kind: "student",
                id: student.id.to_string(),
            });
        }

        let position = self.next_position("students")?;
        write_student(&self.conn, position, student)?;
        debug!("Inserted student {}", student.id);
        Ok(())
    }

    /// Overwrite a stored student's fields, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StudentNotFound`] if no student has this id, or an error
    /// if the database operation fails.
    pub fn update_student(&self, student: &Student) -> Result<()> {
        let affected = self.conn.execute(
            r"
            UPDATE students
            SET name = ?2, class_name = ?3, address = ?4, phone = ?5, notes = ?6, photo = ?7
            WHERE id = ?1
            ",
            params![
                student.id.as_str(),
                student.name,
                student.class_name,
                student.address,
                student.phone,
                student.notes,
                student.photo,
            ],
        )?;

        if affected == 0 {
            return Err(Error::StudentNotFound {
                id: student.id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a student. Their counseling logs are kept.
    ///
    /// Returns `true` if a student was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_student(&self, id: &StudentId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1", [id.as_str()])?;
        Ok(affected > 0)
    }

    /// Append a counseling log after the existing logs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is already stored, or an error
    /// if the database operation fails.
    pub fn insert_log(&self, log: &CounselingLog) -> Result<()> {
        if self.exists("counseling_logs", log.id.as_str())? {
            return Err(Error::DuplicateId {
                kind: "counseling log",
                id: log.id.to_string(),
            });
        }

        let position = self.next_position("counseling_logs")?;
        write_log(&self.conn, position, log)?;
        debug!("Inserted counseling log {}", log.id);
        Ok(())
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn counts(&self) -> Result<StorageCounts> {
        let students: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        let logs: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM counseling_logs", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageCounts {
            students,
            logs,
            db_size_bytes,
        })
    }

    /// Whether a row with `id` exists in `table`.
    fn exists(&self, table: &str, id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Position after the last row of `table`.
    fn next_position(&self, table: &str) -> Result<i64> {
        let position: i64 = self.conn.query_row(
            &format!("SELECT COALESCE(MAX(position) + 1, 0) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(position)
    }

    /// Convert a database row to a Student struct.
    fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<Student> {
        let id: String = row.get(0)?;
        Ok(Student {
            id: StudentId::from(id),
            name: row.get(1)?,
            class_name: row.get(2)?,
            address: row.get(3)?,
            phone: row.get(4)?,
            notes: row.get(5)?,
            photo: row.get(6)?,
        })
    }
}

fn to_position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn write_student(conn: &Connection, position: i64, student: &Student) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO students (id, position, name, class_name, address, phone, notes, photo)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            student.id.as_str(),
            position,
            student.name,
            student.class_name,
            student.address,
            student.phone,
            student.notes,
            student.photo,
        ],
    )?;
    Ok(())
}

fn write_log(conn: &Connection, position: i64, log: &CounselingLog) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO counseling_logs (
            id, position, student_id, student_name, class_name, date, start_time, end_time,
            academic_year, counseling_type, aspect, result, status, follow_up, notes
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        ",
        params![
            log.id.as_str(),
            position,
            log.student_id.as_str(),
            log.student.student_name,
            log.student.class_name,
            log.date.format(DATE_FORMAT).to_string(),
            log.start_time.format(TIME_FORMAT).to_string(),
            log.end_time.format(TIME_FORMAT).to_string(),
            log.academic_year,
            log.counseling_type.label(),
            log.aspect.label(),
            log.result,
            log.status.label(),
            log.follow_up,
            log.notes,
        ],
    )?;
    Ok(())
}

/// Raw text columns of a `counseling_logs` row, before parsing.
struct LogRow {
    id: String,
    student_id: String,
    student_name: String,
    class_name: String,
    date: String,
    start_time: String,
    end_time: String,
    academic_year: String,
    counseling_type: String,
    aspect: String,
    result: String,
    status: String,
    follow_up: String,
    notes: String,
}

impl LogRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            student_id: row.get(1)?,
            student_name: row.get(2)?,
            class_name: row.get(3)?,
            date: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            academic_year: row.get(7)?,
            counseling_type: row.get(8)?,
            aspect: row.get(9)?,
            result: row.get(10)?,
            status: row.get(11)?,
            follow_up: row.get(12)?,
            notes: row.get(13)?,
        })
    }

    fn decode(self) -> Result<CounselingLog> {
        let id = self.id;
        let corrupt = |err: Error| Error::CorruptRow {
            table: "counseling_logs",
            id: id.clone(),
            message: err.to_string(),
        };

        let date = parse_date(&self.date).map_err(corrupt)?;
        let start_time = parse_time("start_time", &self.start_time).map_err(corrupt)?;
        let end_time = parse_time("end_time", &self.end_time).map_err(corrupt)?;
        let counseling_type = self.counseling_type.parse::<CounselingType>().map_err(corrupt)?;
        let aspect = self.aspect.parse::<CounselingAspect>().map_err(corrupt)?;
        let status = self.status.parse::<CounselingStatus>().map_err(corrupt)?;

        Ok(CounselingLog {
            id: id.into(),
            student_id: StudentId::from(self.student_id),
            student: StudentSnapshot {
                student_name: self.student_name,
                class_name: self.class_name,
            },
            date,
            start_time,
            end_time,
            academic_year: self.academic_year,
            counseling_type,
            aspect,
            result: self.result,
            status,
            follow_up: self.follow_up,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCounselingLog, NewStudent};
    use chrono::{NaiveDate, NaiveTime};

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn fields(name: &str, class_name: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            class_name: class_name.to_string(),
            address: "Jl. Melati 3".to_string(),
            phone: "0812-3456".to_string(),
            ..NewStudent::default()
        }
    }

    fn create_test_journal() -> Journal {
        let mut journal = Journal::new();
        let ani = journal.add_student(fields("Ani", "X-1")).id.clone();
        let bayu = journal.add_student(fields("Bayu", "X-2")).id.clone();
        let date = NaiveDate::from_ymd_opt(2024, 10, 16).unwrap();

        let mut entry = NewCounselingLog::new(bayu, date, "2024/2025");
        entry.counseling_type = CounselingType::Klasikal;
        entry.aspect = CounselingAspect::SosialEmosional;
        entry.status = CounselingStatus::ButuhBantuan;
        entry.start_time = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        entry.end_time = NaiveTime::from_hms_opt(8, 15, 30).unwrap();
        entry.result = "Sering terlambat".to_string();
        journal.add_log(entry).unwrap();

        let mut entry = NewCounselingLog::new(ani, date, "2024/2025");
        entry.aspect = CounselingAspect::BakatDanMinat;
        journal.add_log(entry).unwrap();
        journal
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_empty_database_loads_empty_journal() {
        let storage = create_test_storage();
        let journal = storage.load_journal().unwrap();
        assert!(journal.students().is_empty());
        assert!(journal.logs().is_empty());
    }

    #[test]
    fn test_save_and_load_preserves_order_and_fields() {
        let mut storage = create_test_storage();
        let journal = create_test_journal();
        storage.save_journal(&journal).unwrap();

        let loaded = storage.load_journal().unwrap();
        assert_eq!(loaded.students(), journal.students());
        assert_eq!(loaded.logs(), journal.logs());
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let mut storage = create_test_storage();
        storage.save_journal(&create_test_journal()).unwrap();
        storage.save_journal(&Journal::new()).unwrap();

        let counts = storage.counts().unwrap();
        assert_eq!(counts.students, 0);
        assert_eq!(counts.logs, 0);
    }

    #[test]
    fn test_incremental_inserts_append() {
        let storage = create_test_storage();
        let journal = create_test_journal();
        for student in journal.students() {
            storage.insert_student(student).unwrap();
        }
        for log in journal.logs() {
            storage.insert_log(log).unwrap();
        }

        let loaded = storage.load_journal().unwrap();
        assert_eq!(loaded.students(), journal.students());
        assert_eq!(loaded.logs(), journal.logs());
    }

    #[test]
    fn test_insert_duplicate_student() {
        let storage = create_test_storage();
        let student = Student::from_new(StudentId::from("s-1"), fields("Ani", "X-1"));
        storage.insert_student(&student).unwrap();

        let err = storage.insert_student(&student).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { kind: "student", .. }));
    }

    #[test]
    fn test_update_student_keeps_log_snapshot() {
        let mut storage = create_test_storage();
        let mut journal = create_test_journal();
        storage.save_journal(&journal).unwrap();

        let id = journal.students()[1].id.clone();
        let updated = journal
            .update_student(&id, fields("Bayu Pratama", "XI-2"))
            .unwrap()
            .clone();
        storage.update_student(&updated).unwrap();

        let loaded = storage.load_journal().unwrap();
        assert_eq!(loaded.students()[1].name, "Bayu Pratama");
        assert_eq!(loaded.logs()[0].student.student_name, "Bayu");
        assert_eq!(loaded.logs()[0].student.class_name, "X-2");
    }

    #[test]
    fn test_update_missing_student() {
        let storage = create_test_storage();
        let student = Student::from_new(StudentId::from("ghost"), fields("X", "Y"));
        assert!(storage.update_student(&student).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_student_keeps_logs() {
        let mut storage = create_test_storage();
        let journal = create_test_journal();
        storage.save_journal(&journal).unwrap();

        assert!(storage.delete_student(&journal.students()[1].id).unwrap());
        assert!(!storage.delete_student(&StudentId::from("ghost")).unwrap());

        let loaded = storage.load_journal().unwrap();
        assert_eq!(loaded.students().len(), 1);
        assert_eq!(loaded.logs().len(), 2);
    }

    #[test]
    fn test_corrupt_enum_value_is_reported() {
        let mut storage = create_test_storage();
        let journal = create_test_journal();
        storage.save_journal(&journal).unwrap();
        storage
            .conn
            .execute("UPDATE counseling_logs SET status = 'gawat'", [])
            .unwrap();

        let err = storage.load_journal().unwrap_err();
        assert!(matches!(err, Error::CorruptRow { table: "counseling_logs", .. }));
        assert!(err.to_string().contains("gawat"));
    }

    #[test]
    fn test_counts() {
        let mut storage = create_test_storage();
        storage.save_journal(&create_test_journal()).unwrap();

        let counts = storage.counts().unwrap();
        assert_eq!(counts.students, 2);
        assert_eq!(counts.logs, 2);
        assert_eq!(counts.db_size_bytes, 0);
    }

    #[test]
    fn test_counts_follow_incremental_writes() {
        let storage = create_test_storage();
        let journal = create_test_journal();

        for student in journal.students() {
            storage.insert_student(student).unwrap();
        }
        storage.insert_log(&journal.logs()[0]).unwrap();
        let counts = storage.counts().unwrap();
        assert_eq!((counts.students, counts.logs), (2, 1));

        assert!(storage.delete_student(&journal.students()[0].id).unwrap());
        let counts = storage.counts().unwrap();
        assert_eq!((counts.students, counts.logs), (1, 1));
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_file_based() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let journal = create_test_journal();

        {
            let mut storage = Storage::open(&db_path).unwrap();
            storage.save_journal(&journal).unwrap();
        }

        let storage = Storage::open(&db_path).unwrap();
        assert_eq!(storage.load_journal().unwrap().logs(), journal.logs());
        assert!(storage.counts().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("journal.db");

        let storage = Storage::open(&db_path);
        assert!(storage.is_ok());
        assert!(db_path.exists());
    }
}
