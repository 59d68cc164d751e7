//! In-memory journal state.
//!
//! [`Journal`] owns the student roster and the counseling log and exposes the
//! mutations the application performs on them. Both collections keep
//! insertion order. Every mutation bumps a revision counter that derived views
//! (see [`crate::filter::FilteredLogs`]) use to detect change.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{CounselingLog, LogId, NewCounselingLog, NewStudent, Student, StudentId};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

fn next_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// Roster and counseling log of one teacher.
///
/// Every journal value, clones included, gets its own [`instance`](Self::instance)
/// number, so `(instance, revision)` identifies one state of one journal.
#[derive(Debug)]
pub struct Journal {
    students: Vec<Student>,
    logs: Vec<CounselingLog>,
    instance: u64,
    revision: u64,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            students: Vec::new(),
            logs: Vec::new(),
            instance: next_instance(),
            revision: 0,
        }
    }
}

impl Clone for Journal {
    fn clone(&self) -> Self {
        Self {
            students: self.students.clone(),
            logs: self.logs.clone(),
            instance: next_instance(),
            revision: self.revision,
        }
    }
}

/// Serializable form of a [`Journal`], used for backups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSnapshot {
    /// Roster in insertion order.
    #[serde(default)]
    pub students: Vec<Student>,
    /// Counseling logs in insertion order.
    #[serde(default)]
    pub logs: Vec<CounselingLog>,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a journal from previously stored collections.
    ///
    /// Logs whose student has since been deleted are kept; they still carry the
    /// name and class captured when they were recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if two students or two logs share an id.
    pub fn from_parts(students: Vec<Student>, logs: Vec<CounselingLog>) -> Result<Self> {
        let mut seen = HashSet::new();
        for student in &students {
            if !seen.insert(student.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "student",
                    id: student.id.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for log in &logs {
            if !seen.insert(log.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "counseling log",
                    id: log.id.to_string(),
                });
            }
        }

        Ok(Self {
            students,
            logs,
            instance: next_instance(),
            revision: 0,
        })
    }

    /// Build a journal from a backup snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the snapshot repeats an id.
    pub fn from_snapshot(snapshot: JournalSnapshot) -> Result<Self> {
        Self::from_parts(snapshot.students, snapshot.logs)
    }

    /// Copy the collections into a backup snapshot.
    #[must_use]
    pub fn snapshot(&self) -> JournalSnapshot {
        JournalSnapshot {
            students: self.students.clone(),
            logs: self.logs.clone(),
        }
    }

    /// The roster, in insertion order.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// The counseling log, in insertion order.
    #[must_use]
    pub fn logs(&self) -> &[CounselingLog] {
        &self.logs
    }

    /// Change counter, bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Process-unique number of this journal value.
    #[must_use]
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Look up a student.
    #[must_use]
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    /// Look up a counseling log.
    #[must_use]
    pub fn log(&self, id: &LogId) -> Option<&CounselingLog> {
        self.logs.iter().find(|l| &l.id == id)
    }

    /// Look up a student that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StudentNotFound`] if no student has this id.
    pub fn require_student(&self, id: &StudentId) -> Result<&Student> {
        self.student(id)
            .ok_or_else(|| Error::StudentNotFound { id: id.to_string() })
    }

    /// Look up a counseling log that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogNotFound`] if no log has this id.
    pub fn require_log(&self, id: &LogId) -> Result<&CounselingLog> {
        self.log(id)
            .ok_or_else(|| Error::LogNotFound { id: id.to_string() })
    }

    /// Logs recorded for one student, in journal order.
    pub fn logs_for<'a>(&'a self, id: &'a StudentId) -> impl Iterator<Item = &'a CounselingLog> {
        self.logs.iter().filter(move |l| &l.student_id == id)
    }

    /// Add a student under a freshly generated id.
    pub fn add_student(&mut self, fields: NewStudent) -> &Student {
        let student = Student::from_new(StudentId::generate(), fields);
        info!(id = %student.id, name = %student.name, "added student");
        self.push_student(student)
    }

    /// Add a student that already carries an id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is taken.
    pub fn insert_student(&mut self, student: Student) -> Result<&Student> {
        if self.student(&student.id).is_some() {
            return Err(Error::DuplicateId {
                kind: "student",
                id: student.id.to_string(),
            });
        }
        Ok(self.push_student(student))
    }

    fn push_student(&mut self, student: Student) -> &Student {
        self.students.push(student);
        self.revision += 1;
        let last = self.students.len() - 1;
        &self.students[last]
    }

    /// Replace a student's fields, keeping the id.
    ///
    /// Existing logs keep the name and class they were recorded with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StudentNotFound`] if no student has this id.
    pub fn update_student(&mut self, id: &StudentId, fields: NewStudent) -> Result<&Student> {
        let pos = self
            .students
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| Error::StudentNotFound { id: id.to_string() })?;

        self.students[pos] = Student::from_new(id.clone(), fields);
        self.revision += 1;
        debug!(id = %id, "updated student");
        Ok(&self.students[pos])
    }

    /// Remove a student from the roster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StudentNotFound`] if no student has this id.
    pub fn delete_student(&mut self, id: &StudentId) -> Result<Student> {
        let pos = self
            .students
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| Error::StudentNotFound { id: id.to_string() })?;

        let removed = self.students.remove(pos);
        self.revision += 1;
        info!(id = %id, name = %removed.name, "deleted student");
        Ok(removed)
    }

    /// Record a counseling session.
    ///
    /// The student's current name and class are copied into the log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if the referenced student is not on the
    /// roster; nothing is recorded in that case.
    pub fn add_log(&mut self, entry: NewCounselingLog) -> Result<&CounselingLog> {
        let Some(student) = self.student(&entry.student_id) else {
            warn!(student_id = %entry.student_id, "refused counseling log for unknown student");
            return Err(Error::UnknownStudent {
                student_id: entry.student_id.to_string(),
            });
        };

        let log = CounselingLog::record(LogId::generate(), entry, student);
        info!(
            id = %log.id,
            student = %log.student.student_name,
            kind = %log.counseling_type,
            "recorded counseling log"
        );
        Ok(self.push_log(log))
    }

    /// Append an already recorded log, as when restoring a backup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is taken.
    pub fn insert_log(&mut self, log: CounselingLog) -> Result<&CounselingLog> {
        if self.log(&log.id).is_some() {
            return Err(Error::DuplicateId {
                kind: "counseling log",
                id: log.id.to_string(),
            });
        }
        Ok(self.push_log(log))
    }

    fn push_log(&mut self, log: CounselingLog) -> &CounselingLog {
        self.logs.push(log);
        self.revision += 1;
        let last = self.logs.len() - 1;
        &self.logs[last]
    }

    /// Merge a backup into this journal, skipping records whose id is already
    /// present. Returns how many students and logs were added.
    pub fn merge(&mut self, snapshot: JournalSnapshot) -> (usize, usize) {
        let mut added_students = 0;
        for student in snapshot.students {
            if self.insert_student(student).is_ok() {
                added_students += 1;
            }
        }

        let mut added_logs = 0;
        for log in snapshot.logs {
            if self.insert_log(log).is_ok() {
                added_logs += 1;
            }
        }

        debug!(added_students, added_logs, "merged backup");
        (added_students, added_logs)
    }
}
