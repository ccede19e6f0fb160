//! # Configuration Module
//!
//! Loads the proxy's `KEY VALUE` configuration file. The format is
//! deliberately minimal: one `KEY VALUE` pair per line, `#` starts a comment,
//! blank lines are skipped, and unknown keys are logged as a warning rather
//! than treated as fatal.
//!
//! ## Configuration Categories
//!
//! * `PORT` / `ADDRESS` — where the listener binds
//! * `MAX_CLIENT` — the slot budget enforced by the connection table
//! * `LOGGER_FILENAME` — path the file logger appends to
//! * `RULES_FILENAME` — path to the blocklist rules file
//!
//! ## Usage
//!
//! `Config::load` reads a file at the given path and falls back to built-in
//! defaults for anything not mentioned; `Config::default()` alone is enough
//! to run the proxy with no config file at all.

use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Default path used when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "conf/proxy.config";

/// Fully resolved proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub address: String,
    pub max_client: usize,
    pub logger_filename: String,
    pub rules_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            address: "127.0.0.1".to_string(),
            max_client: 10,
            logger_filename: "proxy.log".to_string(),
            rules_filename: "proxy.rules".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to [`Config::default`]
    /// for any key that is absent from the file.
    ///
    /// Unknown keys and malformed lines are logged as warnings (via the
    /// `log` facade) rather than rejected, matching the permissive behavior
    /// of the original parser.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut config = Config::default();

        let contents = fs::read_to_string(path)?;
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default();
            let value = parts.next().map(str::trim).unwrap_or_default();

            if key.is_empty() || value.is_empty() {
                log::warn!("config: malformed line {} in {:?}", lineno + 1, path);
                continue;
            }

            match key {
                "PORT" => match value.parse() {
                    Ok(port) => config.port = port,
                    Err(_) => log::warn!("config: invalid PORT value {:?} at line {}", value, lineno + 1),
                },
                "ADDRESS" => config.address = value.to_string(),
                "MAX_CLIENT" => match value.parse() {
                    Ok(n) => config.max_client = n,
                    Err(_) => log::warn!("config: invalid MAX_CLIENT value {:?} at line {}", value, lineno + 1),
                },
                "LOGGER_FILENAME" => config.logger_filename = value.to_string(),
                "RULES_FILENAME" => config.rules_filename = value.to_string(),
                other => log::warn!("config: unknown key {:?} at line {}", other, lineno + 1),
            }
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("proxy-config-test-{:?}.conf", std::thread::current().id()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_when_file_is_empty() {
        let path = write_temp("");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_known_keys() {
        let path = write_temp(
            "# comment\n\nPORT 9090\nADDRESS 0.0.0.0\nMAX_CLIENT 50\nLOGGER_FILENAME out.log\nRULES_FILENAME deny.rules\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.max_client, 50);
        assert_eq!(config.logger_filename, "out.log");
        assert_eq!(config.rules_filename, "deny.rules");
    }

    #[test]
    fn unknown_key_does_not_change_defaults() {
        let path = write_temp("FOO bar\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Config::load("/nonexistent/path/proxy.config");
        assert!(result.is_err());
    }
}
