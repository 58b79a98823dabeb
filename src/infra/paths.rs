// src/infra/paths.rs — Config path management
//
// All paths respect the CALLMETER_HOME environment variable for isolation.
// When unset, config lives under ~/.callmeter/.

use std::path::PathBuf;

/// Returns the CALLMETER_HOME override, if set.
fn callmeter_home() -> Option<PathBuf> {
    std::env::var_os("CALLMETER_HOME").map(PathBuf::from)
}

/// Home directory, if one can be determined.
pub fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Configuration directory: $CALLMETER_HOME/ or ~/.callmeter/
pub fn config_dir() -> PathBuf {
    if let Some(home) = callmeter_home() {
        return home;
    }
    dirs_home()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".callmeter")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
