use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::form::FormSettings;
use crate::tui::{KeyBindings, Theme};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Theme name, "dark" or "light"
    #[serde(default)]
    pub theme: String,
    /// Keybindings file replacing the built-in bindings
    #[serde(default)]
    pub keybindings: Option<PathBuf>,
    pub form: FormSettings,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load the embedded defaults overlaid with the user's file.
    ///
    /// Without an explicit path the file is `config.json5` in
    /// `$TRAVELFORM_CONFIG` when that is set, else `~/.travelform-config.json5`.
    /// Either is created from the defaults on first run.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        Self::from_path_in(config_path, CONFIG_FOLDER.as_deref())
    }

    fn from_path_in(
        config_path: Option<&PathBuf>,
        config_folder: Option<&Path>,
    ) -> Result<Self, config::ConfigError> {
        let selected_path = match config_path {
            Some(p) => expand_tilde(p),
            None => {
                let default_cfg = default_config_path(config_folder);
                if !default_cfg.exists() {
                    write_defaults(&default_cfg);
                }
                default_cfg
            }
        };
        Self::build(Some(selected_path))
    }

    /// The embedded defaults alone
    pub fn embedded() -> Result<Self, config::ConfigError> {
        Self::build(None)
    }

    fn build(user_file: Option<PathBuf>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        if let Some(path) = user_file {
            debug!("Reading config from {}", path.display());
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Json5).required(true),
            );
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.keybindings = cfg.keybindings.as_ref().map(expand_tilde);
        Ok(cfg)
    }

    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme)
    }

    /// Bindings from the configured file, or the defaults when none is set.
    /// A file that cannot be read falls back to the defaults.
    pub fn keybindings(&self) -> KeyBindings {
        let Some(path) = &self.keybindings else {
            return KeyBindings::default();
        };
        match KeyBindings::load_from_file(path) {
            Ok(bindings) => {
                for problem in bindings.validate() {
                    warn!("Keybindings: {}", problem);
                }
                bindings
            }
            Err(e) => {
                warn!("Could not load keybindings from {}: {}", path.display(), e);
                KeyBindings::default()
            }
        }
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', &base.home_dir().to_string_lossy(), 1));
            }
        }
    }
    path.clone()
}

/// User config location when none is given on the command line
fn default_config_path(config_folder: Option<&Path>) -> PathBuf {
    if let Some(folder) = config_folder {
        return expand_tilde(&folder.to_path_buf()).join("config.json5");
    }
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".travelform-config.json5");
    }
    PathBuf::from(".travelform-config.json5")
}

/// Seed a missing user config with the embedded defaults. Failure is only
/// logged; the build step then reports the missing file.
fn write_defaults(path: &Path) {
    let written = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|_| fs::write(path, CONFIG));
    if let Err(e) = written {
        warn!("Could not write default config to {}: {}", path.display(), e);
    }
}
