use crate::db;
use crate::model::Desk;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_KEY: &str = "seating.config";

const MAX_COLUMNS: u32 = 50;
const MAX_SELECTOR_TICKS: u32 = 200;
const MAX_SELECTOR_INTERVAL_MS: u64 = 2_000;

fn check_range(key: &str, value: u32, max: u32) -> Result<(), String> {
    if value == 0 || value > max {
        return Err(format!("{key} must be between 1 and {max}"));
    }
    Ok(())
}

/// Layout and timing constants. Stored per workspace; every field falls back
/// to its default so partial or older blobs still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeatingConfig {
    pub default_class_name: String,
    pub teacher_desk_x: f64,
    pub teacher_desk_y: f64,

    // Import grid.
    pub grid_columns: u32,
    pub grid_origin_x: f64,
    pub grid_origin_y: f64,
    pub column_spacing: f64,
    pub row_spacing: f64,

    // Group pods.
    pub groups_per_row: u32,
    pub group_origin_x: f64,
    pub group_origin_y: f64,
    pub group_gap: f64,
    pub member_columns: u32,
    pub member_spacing_x: f64,
    pub member_spacing_y: f64,
    pub group_colors: [String; 2],

    // Random picker.
    pub selector_ticks: u32,
    pub selector_interval_ms: u64,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            default_class_name: "PERIOD 1".to_string(),
            teacher_desk_x: 600.0,
            teacher_desk_y: 40.0,
            grid_columns: 5,
            grid_origin_x: 100.0,
            grid_origin_y: 200.0,
            column_spacing: 180.0,
            row_spacing: 130.0,
            groups_per_row: 3,
            group_origin_x: 100.0,
            group_origin_y: 200.0,
            group_gap: 80.0,
            member_columns: 2,
            member_spacing_x: 170.0,
            member_spacing_y: 110.0,
            group_colors: ["#dbeafe".to_string(), "#fef3c7".to_string()],
            selector_ticks: 24,
            selector_interval_ms: 80,
        }
    }
}

impl SeatingConfig {
    pub fn teacher_desk(&self) -> Desk {
        Desk::teacher(self.teacher_desk_x, self.teacher_desk_y)
    }

    pub fn validate(&self) -> Result<(), String> {
        check_range("gridColumns", self.grid_columns, MAX_COLUMNS)?;
        check_range("groupsPerRow", self.groups_per_row, MAX_COLUMNS)?;
        check_range("memberColumns", self.member_columns, MAX_COLUMNS)?;
        check_range("selectorTicks", self.selector_ticks, MAX_SELECTOR_TICKS)?;
        if self.selector_interval_ms > MAX_SELECTOR_INTERVAL_MS {
            return Err(format!(
                "selectorIntervalMs must be <= {MAX_SELECTOR_INTERVAL_MS}"
            ));
        }
        if self.default_class_name.trim().is_empty() {
            return Err("defaultClassName must not be empty".into());
        }
        Ok(())
    }

    /// Overlays the keys of `patch` on top of this config.
    pub fn merged(&self, patch: &serde_json::Value) -> Result<SeatingConfig, String> {
        let Some(patch) = patch.as_object() else {
            return Err("patch must be an object".into());
        };
        let mut base = serde_json::to_value(self).map_err(|e| e.to_string())?;
        if let Some(obj) = base.as_object_mut() {
            for (k, v) in patch {
                if !obj.contains_key(k) {
                    return Err(format!("unknown config key: {k}"));
                }
                obj.insert(k.clone(), v.clone());
            }
        }
        let next: SeatingConfig = serde_json::from_value(base).map_err(|e| e.to_string())?;
        next.validate()?;
        Ok(next)
    }
}

pub fn load_config(conn: &Connection) -> SeatingConfig {
    let raw = match db::storage_get(conn, CONFIG_KEY) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "config read failed; using defaults");
            None
        }
    };
    let Some(raw) = raw else {
        return SeatingConfig::default();
    };
    match serde_json::from_str::<SeatingConfig>(&raw) {
        Ok(cfg) if cfg.validate().is_ok() => cfg,
        Ok(_) | Err(_) => {
            tracing::warn!("stored config is invalid; using defaults");
            SeatingConfig::default()
        }
    }
}

pub fn save_config(conn: &Connection, cfg: &SeatingConfig) -> anyhow::Result<()> {
    db::storage_set(conn, CONFIG_KEY, &serde_json::to_string(cfg)?)
}

/// Process-level settings read from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct ProcessConfig {
    pub log_filter: String,
    pub workspace: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl ProcessConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_filter = lookup("SEATINGD_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        let workspace = lookup("SEATINGD_WORKSPACE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let seed = lookup("SEATINGD_SEED").and_then(|v| v.trim().parse::<u64>().ok());
        Self {
            log_filter,
            workspace,
            seed,
        }
    }
}
