//! `SQLite` schema definitions for guruwali.
//!
//! Both record tables carry a `position` column so that roster and log order
//! survive a round trip through the database.

/// SQL statement to create the students table.
pub const CREATE_STUDENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    class_name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    photo TEXT
)
";

/// SQL statement to create the counseling logs table.
///
/// `student_id` is deliberately not a foreign key: logs outlive the student
/// they were recorded for.
pub const CREATE_LOGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS counseling_logs (
    id TEXT PRIMARY KEY,
    position INTEGER NOT NULL,
    student_id TEXT NOT NULL,
    student_name TEXT NOT NULL,
    class_name TEXT NOT NULL,
    date TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    academic_year TEXT NOT NULL,
    counseling_type TEXT NOT NULL,
    aspect TEXT NOT NULL,
    result TEXT NOT NULL,
    status TEXT NOT NULL,
    follow_up TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT ''
)
";

/// SQL statement to create an index on student position for ordered loads.
pub const CREATE_STUDENT_POSITION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_students_position ON students(position)
";

/// SQL statement to create an index on log position for ordered loads.
pub const CREATE_LOG_POSITION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_logs_position ON counseling_logs(position)
";

/// SQL statement to create an index on `student_id` for per-student lookups.
pub const CREATE_LOG_STUDENT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_logs_student ON counseling_logs(student_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_STUDENTS_TABLE,
    CREATE_LOGS_TABLE,
    CREATE_STUDENT_POSITION_INDEX,
    CREATE_LOG_POSITION_INDEX,
    CREATE_LOG_STUDENT_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_tables_keep_insertion_position() {
        assert!(CREATE_STUDENTS_TABLE.contains("position INTEGER NOT NULL"));
        assert!(CREATE_LOGS_TABLE.contains("position INTEGER NOT NULL"));
    }

    #[test]
    fn test_logs_table_stores_student_snapshot() {
        assert!(CREATE_LOGS_TABLE.contains("student_name TEXT NOT NULL"));
        assert!(CREATE_LOGS_TABLE.contains("class_name TEXT NOT NULL"));
        assert!(!CREATE_LOGS_TABLE.contains("REFERENCES"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
