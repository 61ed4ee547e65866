//! Entity profiles.
//!
//! A profile is a YAML file describing one entity: where its records live,
//! how many unique records to generate, which fields must be present and
//! unique, how to prompt the model, and where to seed the result.
//!
//! ```yaml
//! entity: companies
//! store_path: data/companies.json
//! target_count: 50
//! batch_size: 10
//! mandatory_fields: [name, email]
//! unique_fields:
//!   - name: name
//!   - name: phone
//!     normalizer: phone_digits
//! batch_pause: 1s
//! retry:
//!   max_attempts: 5
//!   base_delay: 4s
//! completion:
//!   model: claude-sonnet-4-5-20250929
//! prompt: |
//!   Generate {batch_size} companies as a JSON array.
//!   Do not reuse any of these:
//!   {exclusions}
//! seeding:
//!   endpoint: http://localhost:8069/api/companies
//!   concurrency_limit: 4
//!   label_field: name
//!   external_id_field: remote_id
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use completion_adapter::{CompletionConfig, PromptTemplate};
use quota_generator::{
    DriverConfig, RetryPolicy, DEFAULT_CIRCUIT_BREAKER_THRESHOLD, DEFAULT_EXCLUSION_SAMPLE_SIZE,
};
use record_store::JsonFileStore;
use seed_core::{Accumulator, UniqueFieldSpec};
use seed_populate::{SeedingEngine, DEFAULT_CONCURRENCY_LIMIT};
use serde::Deserialize;

use crate::config::deserialize_opt_duration;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Failed to read profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid profile: {0}")]
    Invalid(String),
}

/// Retry knobs; unset values keep the driver defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub base_delay: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub max_delay: Option<Duration>,
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionSettings {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedingSettings {
    /// URL each record is POSTed to.
    pub endpoint: Option<String>,
    pub concurrency_limit: Option<usize>,
    /// Record field shown in logs and reports.
    pub label_field: Option<String>,
    /// Record field the assigned identifier is written back into.
    pub external_id_field: Option<String>,
    /// Response field holding the assigned identifier. Defaults to `id`.
    pub response_id_field: Option<String>,
    /// Environment variable holding a bearer token for the endpoint.
    pub token_env: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub request_delay: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityProfile {
    pub entity: String,
    pub store_path: PathBuf,
    pub target_count: usize,
    pub batch_size: usize,
    #[serde(default)]
    pub mandatory_fields: Vec<String>,
    #[serde(default)]
    pub unique_fields: Vec<UniqueFieldSpec>,
    pub circuit_breaker_threshold: Option<u32>,
    pub shrink_on_failure: Option<bool>,
    pub exclusion_sample_size: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub batch_pause: Option<Duration>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub seeding: SeedingSettings,
}

impl EntityProfile {
    /// Load a profile from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a profile from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let profile: EntityProfile = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.entity.trim().is_empty() {
            return Err(ProfileError::Invalid("entity must not be empty".into()));
        }
        if self.batch_size == 0 {
            return Err(ProfileError::Invalid("batch_size must be at least 1".into()));
        }
        for (i, spec) in self.unique_fields.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(ProfileError::Invalid(format!(
                    "unique_fields[{i}] has an empty name"
                )));
            }
            if self.unique_fields[..i].iter().any(|s| s.name == spec.name) {
                return Err(ProfileError::Invalid(format!(
                    "unique field '{}' is declared twice",
                    spec.name
                )));
            }
        }
        if let Some(multiplier) = self.retry.multiplier {
            if !(multiplier.is_finite() && multiplier >= 1.0) {
                return Err(ProfileError::Invalid(
                    "retry.multiplier must be a finite number >= 1".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn accumulator(&self) -> Accumulator {
        Accumulator::new(self.mandatory_fields.clone(), self.unique_fields.clone())
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.store_path.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.retry.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: self.retry.base_delay.unwrap_or(defaults.base_delay),
            max_delay: self.retry.max_delay.unwrap_or(defaults.max_delay),
            multiplier: self.retry.multiplier.unwrap_or(defaults.multiplier),
            ..defaults
        }
    }

    /// Driver settings, with optional command-line overrides.
    pub fn driver_config(
        &self,
        target_count: Option<usize>,
        batch_size: Option<usize>,
    ) -> DriverConfig {
        let mut config = DriverConfig::new(
            self.entity.clone(),
            target_count.unwrap_or(self.target_count),
            batch_size.unwrap_or(self.batch_size),
        )
        .with_retry(self.retry_policy());
        config.circuit_breaker_threshold = self
            .circuit_breaker_threshold
            .unwrap_or(DEFAULT_CIRCUIT_BREAKER_THRESHOLD);
        config.shrink_on_failure = self.shrink_on_failure.unwrap_or(true);
        config.exclusion_sample_size = self
            .exclusion_sample_size
            .unwrap_or(DEFAULT_EXCLUSION_SAMPLE_SIZE);
        config.batch_pause = self.batch_pause.unwrap_or(Duration::ZERO);
        config
    }

    pub fn completion_config(&self, api_key: impl Into<String>) -> CompletionConfig {
        let mut config = CompletionConfig::new(api_key);
        let settings = &self.completion;
        if let Some(model) = &settings.model {
            config.model = model.clone();
        }
        if let Some(max_tokens) = settings.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = settings.temperature {
            config.temperature = temperature;
        }
        if let Some(base_url) = &settings.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = settings.timeout {
            config.timeout = timeout;
        }
        config
    }

    pub fn prompt_template(&self) -> Result<PromptTemplate, ProfileError> {
        if self.prompt.trim().is_empty() {
            return Err(ProfileError::Invalid(format!(
                "profile for '{}' has no prompt",
                self.entity
            )));
        }
        Ok(PromptTemplate::new(self.prompt.clone()))
    }

    /// Seeding engine, with an optional concurrency override.
    pub fn seeding_engine(&self, concurrency_limit: Option<usize>) -> SeedingEngine {
        let limit = concurrency_limit
            .or(self.seeding.concurrency_limit)
            .unwrap_or(DEFAULT_CONCURRENCY_LIMIT);
        let mut engine = SeedingEngine::new(limit)
            .with_request_delay(self.seeding.request_delay.unwrap_or(Duration::ZERO));
        if let Some(field) = &self.seeding.label_field {
            engine = engine.with_label_field(field.clone());
        }
        engine
    }
}
