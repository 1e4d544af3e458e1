use crate::repl::DEFAULT_PROMPT;
use crate::shell::APP_NAME;
use anyhow::Context as _;
use anyhow::Result;
use jcsh_types::JcshError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE: &str = "debug.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prompt: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| JcshError::Config(e.to_string()))?;
        Ok(config)
    }

    fn read_file(name: &str) -> Result<Option<Self>> {
        let xdg_dir =
            xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
        let Some(file_path) = xdg_dir.find_config_file(name) else {
            return Ok(None);
        };
        let toml_str = std::fs::read_to_string(&file_path)
            .with_context(|| format!("failed to read {}", file_path.display()))?;
        Config::parse(&toml_str).map(Some)
    }

    /// Loads the user's config, falling back to defaults when it is missing
    /// or unreadable.
    pub fn from_file(name: &str) -> Self {
        match Config::read_file(name) {
            Ok(Some(conf)) => conf,
            Ok(None) => Config::default(),
            Err(e) => {
                warn!("ignoring config {}: {:#}", name, e);
                Config::default()
            }
        }
    }

    /// Where diagnostics go: the configured file, else the xdg state dir.
    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let xdg_dir =
            xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
        let path = xdg_dir
            .place_state_file(LOG_FILE)
            .context("failed get log path")?;
        Ok(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_config() -> Result<()> {
        let toml_str = r#"
        prompt = "$ "
        log_file = "/tmp/jcsh.log"
        "#;
        let config = Config::parse(toml_str)?;
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/jcsh.log")));
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/jcsh.log"));
        Ok(())
    }

    #[test]
    fn missing_keys_use_defaults() -> Result<()> {
        let config = Config::parse("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt, ": ");
        Ok(())
    }

    #[test]
    fn invalid_config_is_an_error() {
        let err = Config::parse("prompt = [").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JcshError>(),
            Some(JcshError::Config(_))
        ));
    }
}
