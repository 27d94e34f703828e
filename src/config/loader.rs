use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazymodal";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the configuration from `path`, or from the default location.
///
/// A missing file yields the defaults. An explicit `path` that does not
/// exist is an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    if let Some(path) = path {
        return read(path);
    }

    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    read(&path)
}

fn read(path: &Path) -> color_eyre::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config from {}", path.display()))?;
    let config = parse(&content).wrap_err_with(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

pub fn parse(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::modal::{CloseMethod, CloseMethods};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert!(config.modal.destroy_on_close);
        assert_eq!(config.modal.close_methods, CloseMethods::all().methods());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [theme]
            name = "Catppuccin Latte"

            [keybindings.demo]
            open = "n"

            [modal]
            footer = true
            close_methods = ["escape"]

            [transition]
            transform_ms = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.theme.name, "Catppuccin Latte");
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(config.keybindings.demo.open.matches(&n));
        assert_eq!(config.keybindings.demo.open_stacked.display(), "O");
        assert!(config.modal.footer);
        assert!(config.modal.destroy_on_close);
        assert_eq!(config.modal.close_methods, vec![CloseMethod::Escape]);
        assert_eq!(config.transition.transform(), Duration::from_millis(400));
        assert_eq!(
            config.transition.opacity(),
            crate::config::TransitionConfig::default().opacity()
        );
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let err = parse("[keybindings.global]\nquit = \"hyper+q\"\n").unwrap_err();
        assert!(err.to_string().contains("unknown modifier"));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        assert!(load(Some(Path::new("/nonexistent/lazymodal.toml"))).is_err());
    }
}
