//! key=value configuration file.
//!
//! ```text
//! # where snapshots are kept
//! DB_PATH = /var/lib/dutrail/sizes.db
//! LOG_LEVEL = info
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::platform;

const CONFIG_FILE_NAME: &str = "config.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: Option<String>,
    /// file this config was read from, kept for diagnostics
    pub source: PathBuf,
}

impl Config {
    /// Loads the config from `explicit` if given, otherwise from the first
    /// existing default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let searched = default_locations();
                match searched.iter().find(|p| p.is_file()) {
                    Some(found) => found.clone(),
                    None => return Err(Error::ConfigNotFound { searched }),
                }
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content, &path)
    }

    pub fn parse(content: &str, source: &Path) -> Result<Self> {
        let mut db_path = None;
        let mut log_level = None;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::ConfigSyntax {
                    path: source.to_path_buf(),
                    line: idx + 1,
                    content: line.to_string(),
                });
            };

            match key.trim() {
                "DB_PATH" => db_path = Some(expand_home(value.trim())),
                "LOG_LEVEL" => log_level = Some(value.trim().to_string()),
                other => debug!(key = other, "ignoring unknown config key"),
            }
        }

        let db_path = db_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::ConfigMissingKey {
                key: "DB_PATH",
                path: source.to_path_buf(),
            })?;

        Ok(Config {
            db_path,
            log_level: log_level.filter(|l| !l.is_empty()),
            source: source.to_path_buf(),
        })
    }

    /// Log file used by the browser, which cannot write to the terminal.
    pub fn log_path(&self) -> PathBuf {
        let mut name = self.db_path.as_os_str().to_owned();
        name.push(".log");
        PathBuf::from(name)
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "dutrail") {
        locations.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    locations
}

fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => match platform::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(value),
        },
        None => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Config> {
        Config::parse(content, Path::new("test.txt"))
    }

    #[test]
    fn reads_db_path_and_skips_comments() {
        let config = parse("# store\n\nDB_PATH = /tmp/sizes.db\n").unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/sizes.db"));
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let config = parse("DB_PATH=/tmp/a=b.db").unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/a=b.db"));
    }

    #[test]
    fn log_level_is_optional() {
        let config = parse("DB_PATH=/tmp/x.db\nLOG_LEVEL = debug\nCOLOR=never").unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn missing_db_path_is_an_error() {
        let err = parse("LOG_LEVEL=info\n").unwrap_err();
        assert!(matches!(err, Error::ConfigMissingKey { key: "DB_PATH", .. }));
    }

    #[test]
    fn empty_db_path_is_an_error() {
        let err = parse("DB_PATH =   \n").unwrap_err();
        assert!(matches!(err, Error::ConfigMissingKey { .. }));
    }

    #[test]
    fn line_without_equals_reports_line_number() {
        let err = parse("# header\nDB_PATH=/tmp/x.db\njunk\n").unwrap_err();
        match err {
            Error::ConfigSyntax { line, content, .. } => {
                assert_eq!(line, 3);
                assert_eq!(content, "junk");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn log_path_sits_next_to_store() {
        let config = parse("DB_PATH=/var/lib/dutrail/sizes.db").unwrap();
        assert_eq!(config.log_path(), PathBuf::from("/var/lib/dutrail/sizes.db.log"));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        fs::write(&path, "DB_PATH=/tmp/custom.db\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.source, path);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.txt"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
