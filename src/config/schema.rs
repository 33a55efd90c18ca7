/// Configuration schema and defaults for repcoach.
///
/// Sections: `[api]`, `[user]`, `[analytics]`, `[logging]`. Every field has
/// a built-in default; users only set what they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::UserId;

/// Top-level configuration, mapped onto `~/.repcoach/config.toml` and
/// `.repcoach.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub api: ApiConfig,
    pub user: UserConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root every backend path is appended to.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [user]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Identity injected into every page and operation.
    pub id: UserId,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self { id: 1 }
    }
}

// ---------------------------------------------------------------------------
// [analytics]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Exercise the e1RM trend is filtered by when the page mounts.
    pub default_exercise: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_exercise: "Squat".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write one JSONL entry per API call.
    pub enabled: bool,
    /// Journal location; defaults to `~/.repcoach/request-log.jsonl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CoachConfig {
    /// Annotated default config written by `repcoach config init`.
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }
}

const DEFAULT_TOML: &str = r#"# repcoach configuration
#
# Precedence (highest last): built-in defaults, this file, ./.repcoach.toml,
# REPCOACH_* environment variables, command-line flags.

[api]
# Root URL of the coaching backend; every operation path is appended to it.
base_url = "http://127.0.0.1:8000/api"

[user]
# Identity used for every request.
id = 1

[analytics]
# Exercise used for the e1RM trend when the analytics page opens.
default_exercise = "Squat"

[logging]
# Append one JSON line per API call to ~/.repcoach/request-log.jsonl.
enabled = true
"#;
