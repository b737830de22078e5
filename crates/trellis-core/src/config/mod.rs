mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values no component can work with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.sqlite_path.trim().is_empty() {
            bail!("store.sqlite_path must not be empty");
        }
        if self.embedding.dimensions == 0 {
            bail!("embedding.dimensions must be greater than 0");
        }
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be greater than 0");
        }
        check_unit("index.similarity_threshold", self.index.similarity_threshold)?;
        if self.index.max_content_bytes == 0 {
            bail!("index.max_content_bytes must be greater than 0");
        }
        if self.search.default_limit == 0 {
            bail!("search.default_limit must be greater than 0");
        }
        check_unit("search.default_threshold", self.search.default_threshold)?;
        check_unit("search.graph_propagation", self.search.graph_propagation)?;

        let weights = [
            ("search.vector_weight", self.search.vector_weight),
            ("search.structural_weight", self.search.structural_weight),
            ("search.graph_weight", self.search.graph_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                bail!("{name} must be a non-negative number, got {weight}");
            }
        }
        if weights.iter().all(|(_, w)| *w <= 0.0) {
            bail!("at least one search weight must be positive");
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("{name} must be within [0, 1], got {value}");
    }
    Ok(())
}

/// Config file location: `cli`, then `TRELLIS_CONFIG`, then
/// [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("TRELLIS_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
