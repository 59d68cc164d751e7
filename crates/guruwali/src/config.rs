//! Configuration management for guruwali.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! loaded [`Config`] is an immutable value handed to every operation that needs
//! the teacher identity or the academic year.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "guruwali";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "journal.db";

/// Default date format used in exported file names.
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GURUWALI_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/guruwali/config.toml`
/// 3. Default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity printed on every report.
    pub teacher: TeacherData,
    /// Current academic year, e.g. `"2024/2025"`.
    pub academic_year: String,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Report export configuration.
    pub report: ReportConfig,
}

/// The teacher's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherData {
    /// Teacher's full name.
    #[serde(deserialize_with = "text::deserialize")]
    pub name: String,
    /// School name.
    #[serde(deserialize_with = "text::deserialize")]
    pub school: String,
    /// Civil servant registration number (NIP).
    ///
    /// An unquoted numeric value from the environment loses leading zeros;
    /// quote it (`GURUWALI_TEACHER__NIP='"0123"'`) to keep them.
    #[serde(deserialize_with = "text::deserialize")]
    pub nip: String,
}

/// Free-text fields that also accept a bare integer.
///
/// Environment values are parsed as typed data, so an unquoted NIP such as
/// `198001012005012001` arrives as a number.
mod text {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(TextVisitor)
    }

    struct TextVisitor;

    impl Visitor<'_> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i128<E: de::Error>(self, value: i128) -> Result<String, E> {
            Ok(value.to_string())
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/guruwali/journal.db`
    pub database_path: Option<PathBuf>,
}

/// Report export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory exported documents are saved in. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
    /// `strftime` format for the date part of exported file names.
    pub date_format: String,
    /// Escape markup characters in free text. Disable only to reproduce
    /// documents produced by older versions.
    pub escape_text: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            escape_text: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            teacher: TeacherData::default(),
            academic_year: academic_year_for(Local::now().date_naive()),
            storage: StorageConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

/// The academic year a date falls in. Years start in July.
#[must_use]
pub fn academic_year_for(date: NaiveDate) -> String {
    let start = if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}/{}", start, start + 1)
}

fn academic_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})/(\d{4})$").expect("academic year pattern is a valid regex")
    })
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GURUWALI_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let Some(caps) = academic_year_pattern().captures(&self.academic_year) else {
            return Err(Error::config_validation(format!(
                "academic_year must look like 2024/2025, got '{}'",
                self.academic_year
            )));
        };

        let first: i32 = caps[1].parse().unwrap_or_default();
        let second: i32 = caps[2].parse().unwrap_or_default();
        if second != first + 1 {
            return Err(Error::config_validation(format!(
                "academic_year must span consecutive years, got '{}'",
                self.academic_year
            )));
        }

        if self.report.date_format.trim().is_empty() {
            return Err(Error::config_validation("report.date_format must not be empty"));
        }

        // chrono reports unknown specifiers as a formatting error
        let mut rendered = String::new();
        let probe = NaiveDate::MIN.format(&self.report.date_format);
        if std::fmt::write(&mut rendered, format_args!("{probe}")).is_err() {
            return Err(Error::config_validation(format!(
                "invalid report.date_format: {}",
                self.report.date_format
            )));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the report output directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.report
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn valid_config() -> Config {
        Config {
            academic_year: "2024/2025".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_report_config() {
        let report = ReportConfig::default();
        assert!(report.output_dir.is_none());
        assert_eq!(report.date_format, "%d-%m-%Y");
        assert!(report.escape_text);
    }

    #[test]
    fn test_academic_year_for() {
        let august = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(academic_year_for(august), "2024/2025");
        assert_eq!(academic_year_for(march), "2024/2025");
    }

    #[test]
    fn test_validate_rejects_malformed_year() {
        let mut config = valid_config();
        config.academic_year = "2024-2025".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("academic_year"));
    }

    #[test]
    fn test_validate_rejects_non_consecutive_year() {
        let mut config = valid_config();
        config.academic_year = "2024/2026".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("consecutive"));
    }

    #[test]
    fn test_validate_rejects_empty_date_format() {
        let mut config = valid_config();
        config.report.date_format = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_date_format() {
        let mut config = valid_config();
        config.report.date_format = "%Q".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_format"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("journal.db"));
        assert!(path.to_string_lossy().contains("guruwali"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = valid_config();
        config.storage.database_path = Some(PathBuf::from("/custom/journal.db"));
        assert_eq!(config.database_path(), PathBuf::from("/custom/journal.db"));
    }

    #[test]
    fn test_output_dir_default() {
        assert_eq!(valid_config().output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("guruwali"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.report, ReportConfig::default());
            assert_eq!(config.teacher, TeacherData::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
academic_year = "2023/2024"

[teacher]
name = "Siti Aminah, S.Pd."
school = "SMA Negeri 1 Contoh"
nip = "198001012005012001"

[report]
date_format = "%Y%m%d"
"#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.academic_year, "2023/2024");
            assert_eq!(config.teacher.name, "Siti Aminah, S.Pd.");
            assert_eq!(config.teacher.nip, "198001012005012001");
            assert_eq!(config.report.date_format, "%Y%m%d");
            assert!(config.report.escape_text);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_year_in_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "academic_year = \"tahun ini\"\n")?;
            assert!(Config::load_from(Some(PathBuf::from("config.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_load_numeric_nip_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("GURUWALI_TEACHER__NIP", "198001012005012001");
            jail.set_env("GURUWALI_TEACHER__NAME", "Pak Joko");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.teacher.nip, "198001012005012001");
            assert_eq!(config.teacher.name, "Pak Joko");
            Ok(())
        });
    }

    #[test]
    fn test_load_quoted_nip_keeps_leading_zeros() {
        Jail::expect_with(|jail| {
            jail.set_env("GURUWALI_TEACHER__NIP", "\"0123\"");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.teacher.nip, "0123");
            Ok(())
        });
    }

    #[test]
    fn test_teacher_data_accepts_numbers() {
        let json = r#"{"name": "Bu Rina", "nip": 198001012005012001}"#;
        let teacher: TeacherData = serde_json::from_str(json).unwrap();
        assert_eq!(teacher.nip, "198001012005012001");
        assert!(serde_json::from_str::<TeacherData>(r#"{"nip": [1]}"#).is_err());
    }

    #[test]
    fn test_teacher_data_deserialize() {
        let json = r#"{"name": "Pak Joko", "school": "SMP 3"}"#;
        let teacher: TeacherData = serde_json::from_str(json).unwrap();
        assert_eq!(teacher.name, "Pak Joko");
        assert!(teacher.nip.is_empty());
    }
}
