use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Task file used when nothing else is configured
pub const DEFAULT_FILE: &str = "~/taf.md";

/// Editor used when neither the config nor `$EDITOR` names one
pub const DEFAULT_EDITOR: &str = "vim";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// `$TAF_CONFIG`, else `$XDG_CONFIG_HOME/taf/config.toml`, else
/// `~/.config/taf/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("TAF_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|h| h.join(".config")))?;
    Some(base.join("taf").join("config.toml"))
}

/// Read a config file. A missing file gives the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(toml::from_str(&text)?)
}

/// Load the config from its default location, if there is one.
pub fn load_default_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

/// Expand a leading `~` against `home`. Other paths pass through.
pub fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// Pick the task file: `--file` flag, then `$TAF_FILE`, then the config,
/// then `~/taf.md`.
pub fn resolve_task_file(flag: Option<&str>, config: &Config) -> PathBuf {
    let env_file = env::var("TAF_FILE").ok().filter(|f| !f.is_empty());
    let chosen = flag
        .map(str::to_string)
        .or(env_file)
        .or_else(|| config.file.clone())
        .unwrap_or_else(|| DEFAULT_FILE.to_string());
    expand_tilde(&chosen, home_dir().as_deref())
}

/// Editor command: config, then `$EDITOR`, then vim.
pub fn editor_command(config: &Config) -> String {
    config
        .editor
        .clone()
        .or_else(|| env::var("EDITOR").ok().filter(|e| !e.is_empty()))
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "file = \"/tmp/work.md\"\ncolor = false\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.file.as_deref(), Some("/tmp/work.md"));
        assert!(!config.color);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "color = \"maybe\"").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/me");
        assert_eq!(expand_tilde("~/taf.md", Some(home)), PathBuf::from("/home/me/taf.md"));
        assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/me"));
        assert_eq!(expand_tilde("/abs/taf.md", Some(home)), PathBuf::from("/abs/taf.md"));
        assert_eq!(expand_tilde("~bob/taf.md", Some(home)), PathBuf::from("~bob/taf.md"));
        assert_eq!(expand_tilde("~/taf.md", None), PathBuf::from("~/taf.md"));
    }

    #[test]
    fn test_flag_wins_over_config() {
        let config = Config {
            file: Some("/from/config.md".into()),
            ..Config::default()
        };
        assert_eq!(
            resolve_task_file(Some("/from/flag.md"), &config),
            PathBuf::from("/from/flag.md")
        );
    }

    #[test]
    fn test_config_editor_wins() {
        let config = Config {
            editor: Some("nano".into()),
            ..Config::default()
        };
        assert_eq!(editor_command(&config), "nano");
    }
}
