// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration loading.
//
// Settings come from a JSON file: the one named on the command line, or
// `config.json` in the data directory. Missing keys take their defaults.

use std::path::{Path, PathBuf};

use folio_core::AppConfig;
use folio_core::error::Result;
use tracing::{debug, info, warn};

use super::data_dir;

pub const CONFIG_FILE: &str = "config.json";

/// Load the effective configuration.
///
/// An explicitly named file must exist and parse. The implicit file in the
/// data directory is optional, and a broken one is logged and ignored.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => {
            let config = read_config(path)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        None => Ok(load_default_config(&default_config_path())),
    }
}

pub fn default_config_path() -> PathBuf {
    data_dir::data_dir().join(CONFIG_FILE)
}

fn load_default_config(path: &Path) -> AppConfig {
    if !path.exists() {
        debug!(path = %path.display(), "No configuration file, using defaults");
        return AppConfig::default();
    }
    match read_config(path) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded configuration");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "Ignoring unreadable configuration");
            AppConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write `config` as pretty JSON.
pub fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Configuration saved");
    Ok(())
}
