//! Run settings
//!
//! Settings are read from `precommit-run.toml` in the project base directory
//! when it exists; every field is optional and falls back to the defaults
//! below. The CLI layers its flags on top.
//!
//! ```toml
//! executable = "pre-commit"
//! hooks = ["pretty-format-json", "mixed-line-ending"]
//! files = ["docs/openapi.json", "src/**/*.yaml"]
//! fail_on_modification = true
//! timeout_secs = 120
//!
//! [environment]
//! GIT_CONFIG_PARAMETERS = "'core.autocrlf=false'"
//! ```

use crate::Result;
use indexmap::IndexMap;
use precommit_core::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name of the optional settings file, relative to the base directory
pub const SETTINGS_FILE_NAME: &str = "precommit-run.toml";

/// Default run timeout for a single hook, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default timeout for the `--version` availability probe, in seconds
pub const DEFAULT_INSTALL_CHECK_TIMEOUT_SECS: u64 = 10;

/// Settings for one run of the configured hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Executable name or path of the pre-commit tool
    pub executable: String,

    /// Hook ids or aliases, executed in this order
    pub hooks: Vec<String>,

    /// Files to run on: literal paths or glob patterns relative to the base directory
    pub files: Vec<String>,

    /// Skip execution entirely
    pub skip: bool,

    /// Skip instead of failing when the tool is not installed
    pub skip_if_not_installed: bool,

    /// Skip instead of failing when `.pre-commit-config.yaml` is missing
    pub skip_if_config_not_found: bool,

    /// Skip undeclared hooks instead of failing
    pub skip_if_hook_not_found: bool,

    /// Treat exit code 1 (files modified) as a failure
    pub fail_on_modification: bool,

    /// Timeout for a single hook run, in seconds
    pub timeout_secs: u64,

    /// Timeout for the availability probe, in seconds
    pub install_check_timeout_secs: u64,

    /// Extra environment variables for the tool, merged over the inherited environment
    pub environment: IndexMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            executable: "pre-commit".to_string(),
            hooks: Vec::new(),
            files: Vec::new(),
            skip: false,
            skip_if_not_installed: true,
            skip_if_config_not_found: true,
            skip_if_hook_not_found: true,
            fail_on_modification: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            install_check_timeout_secs: DEFAULT_INSTALL_CHECK_TIMEOUT_SECS,
            environment: IndexMap::new(),
        }
    }
}

impl RunConfig {
    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails, or the
    /// settings are invalid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&content).map_err(|e| {
            Error::Config(format!("Invalid settings file {}: {e}", path.display()))
        })
    }

    /// Load `precommit-run.toml` from `base_dir`, or defaults if it does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load_from_base_dir(base_dir: &Path) -> Result<Self> {
        let settings_path = base_dir.join(SETTINGS_FILE_NAME);
        if settings_path.exists() {
            tracing::debug!("Loading settings from {}", settings_path.display());
            Self::load(&settings_path)
        } else {
            tracing::debug!(
                "No {} in {}, using defaults",
                SETTINGS_FILE_NAME,
                base_dir.display()
            );
            Ok(Self::default())
        }
    }

    /// Parse settings from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails or validation fails
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings
    ///
    /// Checks for:
    /// - Non-empty executable
    /// - Non-empty hook ids
    /// - Valid environment variable names
    /// - Non-zero timeouts
    ///
    /// An empty hook list is not rejected here: it is reported when a run is
    /// attempted, after the `skip` flag has had a chance to apply.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.executable.trim().is_empty() {
            return Err(Error::Config("'executable' cannot be empty".to_string()));
        }

        if self.hooks.iter().any(|hook| hook.trim().is_empty()) {
            return Err(Error::Config("Hook ids cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("'timeout_secs' must be greater than 0".to_string()));
        }

        if self.install_check_timeout_secs == 0 {
            return Err(Error::Config(
                "'install_check_timeout_secs' must be greater than 0".to_string(),
            ));
        }

        for key in self.environment.keys() {
            if key.is_empty() || key.contains('=') || key.contains('\0') {
                return Err(Error::Config(format!(
                    "Invalid environment variable name: '{key}'"
                )));
            }
        }

        Ok(())
    }

    /// Run timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Availability probe timeout as a [`Duration`]
    #[must_use]
    pub fn install_check_timeout(&self) -> Duration {
        Duration::from_secs(self.install_check_timeout_secs)
    }
}
