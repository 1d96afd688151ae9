use serde::{Deserialize, Serialize};

/// Configuration from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Task file path. A leading `~` is expanded against `$HOME`.
    #[serde(default)]
    pub file: Option<String>,
    /// Editor command for `--edit`. Falls back to `$EDITOR`, then `vim`.
    #[serde(default)]
    pub editor: Option<String>,
    /// Styled terminal output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: None,
            editor: None,
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.color);
    }

    #[test]
    fn all_keys() {
        let config: Config = toml::from_str(
            r#"
file = "~/notes/todo.md"
editor = "nano"
color = false
"#,
        )
        .unwrap();
        assert_eq!(config.file.as_deref(), Some("~/notes/todo.md"));
        assert_eq!(config.editor.as_deref(), Some("nano"));
        assert!(!config.color);
    }
}
