/// CLI configuration
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use voxprep_core::{NormalizationTarget, PrepError, Result, SoftKnee, ValidationPolicy};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "voxprep.toml";

/// Environment variable prefix, e.g. `VOXPREP_KNEE__RATIO`
const ENV_PREFIX: &str = "VOXPREP";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoxprepConfig {
    /// Named target + policy pairs, one per downstream provider
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Knee shape shared by every profile
    #[serde(default)]
    pub knee: Option<SoftKnee>,

    #[serde(default = "default_integrated_loudness")]
    pub integrated_loudness: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    pub target: NormalizationTarget,
    pub policy: ValidationPolicy,
}

impl VoxprepConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `./voxprep.toml` is read
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PrepError::invalid_config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with VOXPREP_)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PrepError::invalid_config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PrepError::invalid_config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(knee) = &self.knee {
            knee.validate()?;
        }

        for (name, profile) in &self.profiles {
            if name.trim().is_empty() {
                return Err(PrepError::invalid_config("profile names must not be empty"));
            }
            profile
                .target
                .validate()
                .and_then(|()| profile.policy.validate())
                .map_err(|e| match e {
                    PrepError::InvalidConfig(msg) => {
                        PrepError::invalid_config(format!("profile '{name}': {msg}"))
                    }
                    other => other,
                })?;
        }

        Ok(())
    }

    /// Look up a profile by name, ignoring ASCII case
    ///
    /// The loader lowercases every key, so `[profiles.ElevenLabs]` is stored
    /// as `elevenlabs`.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        let lowered = name.to_ascii_lowercase();
        let found = self.profiles.get(&lowered).or_else(|| {
            self.profiles
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, profile)| profile)
        });

        found.ok_or_else(|| {
            let available = if self.profiles.is_empty() {
                "none configured".to_string()
            } else {
                self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            PrepError::invalid_config(format!(
                "unknown profile '{name}' (available: {available})"
            ))
        })
    }

    /// The configured knee, or the default shape
    pub fn knee(&self) -> SoftKnee {
        self.knee.unwrap_or_default()
    }
}

fn default_integrated_loudness() -> bool {
    true
}

impl Default for VoxprepConfig {
    fn default() -> Self {
        Self {
            profiles: BTreeMap::new(),
            knee: None,
            integrated_loudness: default_integrated_loudness(),
        }
    }
}
