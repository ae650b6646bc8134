//! File-backed settings source
//!
//! Settings live in TOML files under a `[godotFormatter]` table. The global
//! file is overlaid key by key by the project file, then environment
//! overrides are applied.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::settings::SettingsSource;
use crate::error::ConfigError;
use crate::models::config::{Configuration, SETTINGS_NAMESPACE, keys};

const APP_DIR: &str = "godot-formatter";
const PROJECT_DIR: &str = ".godot-formatter";
const SETTINGS_FILE: &str = "settings.toml";

/// Overrides `gdscriptFormatterPath` and disables the built-in binary
pub const ENV_EXECUTABLE: &str = "GODOT_FORMATTER_PATH";

type Layer = HashMap<String, Value>;

/// Settings read from global and project TOML files
pub struct TomlSettings {
    global_path: PathBuf,
    project_path: PathBuf,
    values: RwLock<Layer>,
}

impl TomlSettings {
    /// Settings for a project root, using the standard file locations
    pub fn for_root(root: &Path) -> Self {
        Self::with_paths(global_settings_path(), project_settings_path(root))
    }

    /// Settings backed by explicit global and project files
    pub fn with_paths(global_path: PathBuf, project_path: PathBuf) -> Self {
        Self {
            global_path,
            project_path,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Global settings file
    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    /// Project settings file
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Global or project settings file
    pub fn settings_path(&self, global: bool) -> &Path {
        if global {
            &self.global_path
        } else {
            &self.project_path
        }
    }

    /// Re-read both files; missing files count as empty
    pub async fn reload(&self) -> Result<(), ConfigError> {
        let mut merged = load_layer(&self.global_path).await?;
        merged.extend(load_layer(&self.project_path).await?);
        apply_env_overrides(&mut merged);

        tracing::debug!(
            "Loaded {} settings from {} and {}",
            merged.len(),
            self.global_path.display(),
            self.project_path.display()
        );

        *self.values.write().unwrap_or_else(PoisonError::into_inner) = merged;
        Ok(())
    }

    /// Write a settings file holding the defaults
    pub async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.settings_path(global).to_path_buf();
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.display().to_string()));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, default_settings_toml()?).await?;

        tracing::info!("Wrote default settings to {}", path.display());
        Ok(path)
    }
}

impl SettingsSource for TomlSettings {
    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&format!("{}.{}", namespace, key))
            .cloned()
    }
}

/// Global settings file: `$XDG_CONFIG_HOME` or `~/.config`, then `godot-formatter/settings.toml`
pub fn global_settings_path() -> PathBuf {
    // XDG standard: ~/.config/godot-formatter/settings.toml
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}

/// Project settings file under `root`
pub fn project_settings_path(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR).join(SETTINGS_FILE)
}

/// Default settings rendered as a `[godotFormatter]` table
pub fn default_settings_toml() -> Result<String, ConfigError> {
    let defaults = Configuration::default();

    let mut section = toml::Table::new();
    section.insert(keys::ENABLE_FORMATTER.into(), defaults.enabled_format.into());
    section.insert(keys::ENABLE_LINTER.into(), defaults.enabled_lint.into());
    section.insert(keys::INDENT_SIZE.into(), i64::from(defaults.indent_size).into());
    section.insert(keys::USE_SPACES.into(), defaults.use_spaces.into());
    section.insert(keys::REORDER_CODE.into(), defaults.reorder_code.into());
    section.insert(keys::SAFE.into(), defaults.safe.into());
    section.insert(keys::EXECUTABLE_PATH.into(), defaults.executable_path.into());
    section.insert(keys::USE_BUILT_IN.into(), defaults.use_built_in.into());
    section.insert(
        keys::MAX_LINE_LENGTH.into(),
        i64::from(defaults.max_line_length).into(),
    );
    section.insert(
        keys::IGNORED_RULES.into(),
        toml::Value::Array(Vec::new()),
    );

    let mut root = toml::Table::new();
    root.insert(SETTINGS_NAMESPACE.into(), toml::Value::Table(section));
    toml::to_string_pretty(&root).map_err(|e| ConfigError::Serialize(e.to_string()))
}

async fn load_layer(path: &Path) -> Result<Layer, ConfigError> {
    if !path.exists() {
        return Ok(Layer::new());
    }
    let content = tokio::fs::read_to_string(path).await?;
    parse_layer(&content).map_err(|message| ConfigError::Parse {
        path: path.display().to_string(),
        message,
    })
}

fn parse_layer(content: &str) -> Result<Layer, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;

    let mut layer = Layer::new();
    for (namespace, section) in table {
        let toml::Value::Table(section) = section else {
            continue;
        };
        for (key, value) in section {
            let value = serde_json::to_value(&value).map_err(|e| e.to_string())?;
            layer.insert(format!("{}.{}", namespace, key), value);
        }
    }
    Ok(layer)
}

fn apply_env_overrides(layer: &mut Layer) {
    if let Ok(path) = std::env::var(ENV_EXECUTABLE)
        && !path.trim().is_empty()
    {
        layer.insert(
            format!("{}.{}", SETTINGS_NAMESPACE, keys::EXECUTABLE_PATH),
            Value::String(path),
        );
        layer.insert(
            format!("{}.{}", SETTINGS_NAMESPACE, keys::USE_BUILT_IN),
            Value::Bool(false),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::settings::SettingsResolver;

    #[test]
    fn test_parse_layer() {
        let layer = parse_layer(
            r#"
            [godotFormatter]
            indentSize = 2
            useSpaces = true
            ignoredRules = "a,b"

            [other]
            key = 1
            "#,
        )
        .unwrap();
        assert_eq!(layer["godotFormatter.indentSize"], Value::from(2));
        assert_eq!(layer["godotFormatter.useSpaces"], Value::Bool(true));
        assert_eq!(layer["godotFormatter.ignoredRules"], Value::from("a,b"));
        assert_eq!(layer["other.key"], Value::from(1));
    }

    #[test]
    fn test_parse_layer_rejects_invalid_toml() {
        assert!(parse_layer("[godotFormatter\nindentSize = ").is_err());
    }

    #[tokio::test]
    async fn test_project_overrides_global_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        tokio::fs::write(
            &global,
            "[godotFormatter]\nindentSize = 8\nuseSpaces = true\n",
        )
        .await
        .unwrap();
        tokio::fs::write(&project, "[godotFormatter]\nindentSize = 2\n")
            .await
            .unwrap();

        let settings = Arc::new(TomlSettings::with_paths(global, project));
        settings.reload().await.unwrap();

        let resolver = SettingsResolver::new(settings);
        let config = resolver.resolve();
        assert_eq!(config.indent_size, 2);
        assert!(config.use_spaces);
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = TomlSettings::with_paths(
            dir.path().join("nope-global.toml"),
            dir.path().join("nope-project.toml"),
        );
        settings.reload().await.unwrap();
        assert!(settings.get(SETTINGS_NAMESPACE, keys::INDENT_SIZE).is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project.toml");
        tokio::fs::write(&project, "not = [valid").await.unwrap();

        let settings = TomlSettings::with_paths(dir.path().join("global.toml"), project);
        let err = settings.reload().await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_init_writes_defaults_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".godot-formatter").join("settings.toml");
        let settings = Arc::new(TomlSettings::with_paths(
            dir.path().join("global.toml"),
            project.clone(),
        ));

        let written = settings.init(false, false).await.unwrap();
        assert_eq!(written, project);
        assert!(matches!(
            settings.init(false, false).await,
            Err(ConfigError::AlreadyExists(_))
        ));
        assert!(settings.init(false, true).await.is_ok());

        settings.reload().await.unwrap();
        let config = SettingsResolver::new(settings).resolve();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_project_settings_path() {
        assert_eq!(
            project_settings_path(Path::new("/proj")),
            PathBuf::from("/proj/.godot-formatter/settings.toml")
        );
    }
}
