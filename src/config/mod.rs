pub mod init;
mod schema;

pub use schema::{Config, SetDefinition, ThemeConfig, DEFAULT_SET_COUNT};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/wine-rater/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wine-rater")
}

/// Get the default config file path (~/.config/wine-rater/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/wine-rater/config.yaml)
///
/// A missing default config file is not an error: the built-in defaults are
/// used instead. A file given explicitly must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    tracing::debug!(path = %config_path.display(), sets = config.sets.len(), "Loaded config");
    Ok(config)
}

/// Validate the whole configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = match crate::scoring::validate_scoring(&config.scoring, &config.limits) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.sets.is_empty() {
        errors.push("sets: at least one set is required".to_string());
    }

    let mut seen = HashSet::new();
    for (i, def) in config.sets.iter().enumerate() {
        if def.id.trim().is_empty() {
            errors.push(format!("sets[{}].id: must not be empty", i));
        } else if !seen.insert(def.id.as_str()) {
            errors.push(format!("sets[{}].id: duplicate id '{}'", i, def.id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("missing.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "limits:\n  min_items: 2\n  max_items: 6\n").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.limits.min_items, 2);
        assert_eq!(config.sets.len(), DEFAULT_SET_COUNT);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "limits: [oops\n").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_duplicate_and_empty_ids() {
        let mut config = Config::default();
        config.sets[1].id = "set1".to_string();
        config.sets[2].id = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("duplicate")));
    }

    #[test]
    fn test_validate_no_sets() {
        let mut config = Config::default();
        config.sets.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("at least one set"));
    }

    #[test]
    fn test_validate_includes_scoring_errors() {
        let mut config = Config::default();
        config.scoring.step = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("scoring.step")));
    }
}
