/// Configuration system for repcoach.
///
/// Layered, later layers win at the key level:
///
/// 1. **Built-in defaults**: [`schema::CoachConfig::default()`]
/// 2. **User global config**: `~/.repcoach/config.toml`
/// 3. **Project local config**: `.repcoach.toml` in the working directory
/// 4. **Environment variables**: `REPCOACH_*`
///
/// Command-line flags are applied on top by the CLI.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::CoachConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> CoachConfig {
    let files: Vec<PathBuf> = [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
        .collect();
    let mut config = load_layers(&files);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing or malformed files are skipped; a broken project file must not
/// stop the app from reaching the backend.
pub fn load_layers(files: &[PathBuf]) -> CoachConfig {
    let mut merged = defaults_as_value();

    for path in files {
        if let Some(layer) = read_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into::<CoachConfig>().unwrap_or_default()
}

fn defaults_as_value() -> toml::Value {
    toml::Value::try_from(CoachConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject files that parse as TOML but not as our schema.
    value.clone().try_into::<CoachConfig>().ok()?;
    Some(value)
}

/// Deep-merge `overlay` into `base`: tables merge key by key, everything
/// else is replaced.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.repcoach/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".repcoach").join("config.toml"))
}

/// Path to the project local config: `.repcoach.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".repcoach.toml"))
}

pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `REPCOACH_*` overrides read through `lookup`.
///
/// - `REPCOACH_API_URL`: backend root URL
/// - `REPCOACH_USER_ID`: user identity
/// - `REPCOACH_EXERCISE`: default analytics exercise
/// - `REPCOACH_LOGGING`: request journal on/off (`1`/`true`/`yes`/`on`)
pub fn apply_env_overrides(config: &mut CoachConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("REPCOACH_API_URL")
        && !url.is_empty()
    {
        config.api.base_url = url;
    }
    if let Some(id) = lookup("REPCOACH_USER_ID")
        && let Ok(id) = id.trim().parse()
    {
        config.user.id = id;
    }
    if let Some(exercise) = lookup("REPCOACH_EXERCISE")
        && !exercise.trim().is_empty()
    {
        config.analytics.default_exercise = exercise;
    }
    if let Some(val) = lookup("REPCOACH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.repcoach/config.toml`.
///
/// Fails if the file exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    write_file(&path, CoachConfig::default_toml())?;
    Ok(path)
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Set a dotted key (e.g. `api.base_url`) in the global config file.
///
/// Starts from the existing file, or from the defaults if there is none.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config file")?
    } else {
        defaults_as_value()
    };

    set_toml_value(&mut root, key, value)?;

    // Refuse to write something the loader would then ignore.
    root.clone()
        .try_into::<CoachConfig>()
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    write_file(&path, &output)
}

/// Set a value in a TOML tree using a dotted key path. The new value takes
/// the type of the value it replaces; unknown leaves are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw: &str) -> Result<()> {
    let (sections, leaf) = match key.rsplit_once('.') {
        Some((sections, leaf)) => (Some(sections), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for section in sections.into_iter().flat_map(|s| s.split('.')) {
        current = current
            .get_mut(section)
            .with_context(|| format!("config key not found: section '{section}' in '{key}'"))?;
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("'{key}' does not name a value inside a section"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw)),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(
            raw.trim()
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw}'"))?,
        ),
        Some(toml::Value::Float(_)) => toml::Value::Float(
            raw.trim()
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw}'"))?,
        ),
        _ => toml::Value::String(raw.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// The effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.repcoach/ directory")?;
    }
    fs::write(path, content).context("failed to write config file")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
