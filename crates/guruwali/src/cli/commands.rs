//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand, ValueEnum};

use crate::filter::TypeFilter;
use crate::model::{self, CounselingAspect, CounselingStatus, CounselingType, NewStudent};

/// Student roster commands.
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// Add a student to the roster
    Add(StudentArgs),

    /// List the roster
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one student with their counseling logs
    Show {
        /// Student id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change a student's fields; omitted fields are kept
    Edit {
        /// Student id
        id: String,

        /// Fields to change
        #[command(flatten)]
        fields: StudentEditArgs,
    },

    /// Remove a student from the roster (their logs are kept)
    Delete {
        /// Student id
        id: String,
    },

    /// Export the roster as a Word document
    Export {
        /// Directory to write the document to
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

/// Fields of a new student.
#[derive(Debug, Args)]
pub struct StudentArgs {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Class, e.g. "XI IPA 2"
    #[arg(short = 'k', long = "class")]
    pub class_name: String,

    /// Home address
    #[arg(short, long, default_value = "")]
    pub address: String,

    /// Phone number
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Photo as an embeddable data URL
    #[arg(long)]
    pub photo: Option<String>,
}

impl From<StudentArgs> for NewStudent {
    fn from(args: StudentArgs) -> Self {
        Self {
            name: args.name,
            class_name: args.class_name,
            address: args.address,
            phone: args.phone,
            notes: args.notes,
            photo: args.photo,
        }
    }
}

/// Optional replacements for a student's fields.
#[derive(Debug, Default, Args)]
pub struct StudentEditArgs {
    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New class
    #[arg(short = 'k', long = "class")]
    pub class_name: Option<String>,

    /// New address
    #[arg(short, long)]
    pub address: Option<String>,

    /// New phone number
    #[arg(short, long)]
    pub phone: Option<String>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,

    /// New photo data URL; an empty value removes the photo
    #[arg(long)]
    pub photo: Option<String>,
}

impl StudentEditArgs {
    /// Apply the given replacements on top of `current`.
    #[must_use]
    pub fn apply(self, current: NewStudent) -> NewStudent {
        NewStudent {
            name: self.name.unwrap_or(current.name),
            class_name: self.class_name.unwrap_or(current.class_name),
            address: self.address.unwrap_or(current.address),
            phone: self.phone.unwrap_or(current.phone),
            notes: self.notes.unwrap_or(current.notes),
            photo: self.photo.or(current.photo),
        }
    }
}

/// Counseling log commands.
#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Record a counseling session
    Add(LogArgs),

    /// List counseling logs
    List {
        /// Session types to include
        #[arg(short = 't', long = "type", value_enum, default_value = "all")]
        filter: FilterArg,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one counseling log
    Show {
        /// Log id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Export the counseling journal as a Word document
    Export {
        /// Session types to include
        #[arg(short = 't', long = "type", value_enum, default_value = "all")]
        filter: FilterArg,

        /// Directory to write the document to
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

/// Fields of a new counseling log.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Id of the counseled student
    #[arg(short, long = "student")]
    pub student_id: String,

    /// Session date as YYYY-MM-DD (defaults to today)
    #[arg(short, long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Session start as HH:MM
    #[arg(long, value_parser = parse_time_arg)]
    pub start: NaiveTime,

    /// Session end as HH:MM
    #[arg(long, value_parser = parse_time_arg)]
    pub end: NaiveTime,

    /// Academic year (defaults to the configured one)
    #[arg(long)]
    pub academic_year: Option<String>,

    /// Session format
    #[arg(short = 't', long = "type", value_enum, default_value = "individual")]
    pub counseling_type: SessionTypeArg,

    /// Development aspect
    #[arg(short, long, value_enum, default_value = "akademik")]
    pub aspect: AspectArg,

    /// Outcome narrative
    #[arg(short, long, default_value = "")]
    pub result: String,

    /// Outcome severity
    #[arg(long, value_enum, default_value = "baik")]
    pub status: StatusArg,

    /// Agreed follow-up action
    #[arg(short, long, default_value = "")]
    pub follow_up: String,

    /// Free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    model::parse_date(input).map_err(|e| e.to_string())
}

fn parse_time_arg(input: &str) -> Result<NaiveTime, String> {
    model::parse_time("time", input).map_err(|e| e.to_string())
}

/// Statistics command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Backup commands.
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write the whole journal to a JSON file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// Read a JSON backup into the journal
    Import {
        /// Backup file
        file: PathBuf,

        /// Replace the journal instead of merging into it
        #[arg(long)]
        replace: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Log filter argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterArg {
    /// Individual and classical sessions
    #[default]
    All,
    /// Individual sessions only
    Individual,
    /// Classical sessions only
    Klasikal,
}

impl From<FilterArg> for TypeFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Individual => Self::Only(CounselingType::Individual),
            FilterArg::Klasikal => Self::Only(CounselingType::Klasikal),
        }
    }
}

/// Session format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SessionTypeArg {
    /// One-on-one session
    Individual,
    /// Whole-group session
    Klasikal,
}

impl From<SessionTypeArg> for CounselingType {
    fn from(arg: SessionTypeArg) -> Self {
        match arg {
            SessionTypeArg::Individual => Self::Individual,
            SessionTypeArg::Klasikal => Self::Klasikal,
        }
    }
}

/// Development aspect argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AspectArg {
    /// Akademik
    Akademik,
    /// Karakter
    Karakter,
    /// Sosial-Emosional
    SosialEmosional,
    /// Kedisiplinan
    Kedisiplinan,
    /// Bakat dan Minat
    BakatDanMinat,
}

impl From<AspectArg> for CounselingAspect {
    fn from(arg: AspectArg) -> Self {
        match arg {
            AspectArg::Akademik => Self::Akademik,
            AspectArg::Karakter => Self::Karakter,
            AspectArg::SosialEmosional => Self::SosialEmosional,
            AspectArg::Kedisiplinan => Self::Kedisiplinan,
            AspectArg::BakatDanMinat => Self::BakatDanMinat,
        }
    }
}

/// Outcome severity argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// baik
    Baik,
    /// perlu perhatian
    PerluPerhatian,
    /// butuh bantuan
    ButuhBantuan,
}

impl From<StatusArg> for CounselingStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Baik => Self::Baik,
            StatusArg::PerluPerhatian => Self::PerluPerhatian,
            StatusArg::ButuhBantuan => Self::ButuhBantuan,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
