use std::path::PathBuf;

use super::Config;
use crate::settings::RunSettings;

/// Supplies the settings snapshot for each new run.
pub trait SettingsSource {
    fn snapshot(&self) -> RunSettings;
}

impl SettingsSource for Config {
    fn snapshot(&self) -> RunSettings {
        self.run_settings()
    }
}

impl SettingsSource for RunSettings {
    fn snapshot(&self) -> RunSettings {
        self.validated()
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Box<T> {
    fn snapshot(&self) -> RunSettings {
        (**self).snapshot()
    }
}

/// Re-reads the config file on every start so saved edits apply to the next
/// run without restarting the host.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsSource for ConfigFile {
    fn snapshot(&self) -> RunSettings {
        match Config::load_from(&self.path) {
            Ok(config) => config.run_settings(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to reload settings, using defaults");
                Config::default().run_settings()
            }
        }
    }
}
