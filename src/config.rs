//! Run configuration read from the environment (and `.env`, loaded by the
//! binary before this runs).
//!
//! | Variable            | Default                     |
//! |---------------------|-----------------------------|
//! | `REPORT_OUTPUT_DIR` | `.`                         |
//! | `UNDER_FIVE_BASIS`  | `classified`                |
//! | `ANSWER_SCHEME`     | `auto`                      |
//! | `LOG_FILE_PATH`     | `logs/screening_report.log` |

use crate::analyzers::aggregate::Under5Basis;
use crate::analyzers::answers::SchemeChoice;
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_LOG_FILE: &str = "logs/screening_report.log";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub under_five_basis: Under5Basis,
    pub answer_scheme: SchemeChoice,
    pub log_file_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            under_five_basis: Under5Basis::default(),
            answer_scheme: SchemeChoice::default(),
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl ReportConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their
    /// defaults, invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("REPORT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(basis) = get("UNDER_FIVE_BASIS") {
            config.under_five_basis = parse_var("UNDER_FIVE_BASIS", &basis)?;
        }
        if let Some(scheme) = get("ANSWER_SCHEME") {
            config.answer_scheme = parse_var("ANSWER_SCHEME", &scheme)?;
        }
        if let Some(path) = get("LOG_FILE_PATH") {
            config.log_file_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Output path for `file_name` under the configured directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|e| anyhow!("{key}: {e}"))
}
