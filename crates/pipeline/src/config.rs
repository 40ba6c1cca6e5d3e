//! Pipeline configuration
//!
//! Layered: built-in defaults, then an optional file (TOML, YAML or JSON by
//! extension), then `WAYGUIDE_*` environment variables. Nested keys use a
//! double underscore, e.g. `WAYGUIDE_ANNOUNCE__REANNOUNCE_WINDOW=90`.

use std::path::Path;

use alerting::AnnounceConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::PipelineError;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Suppression window and confidence threshold
    pub announce: AnnounceConfig,
    /// Rate at which frames are handed to detectors; `None` processes every frame
    pub target_fps: Option<f64>,
    /// Report progress every this many sampled frames
    pub progress_interval: u64,
    /// Draw detection boxes on frames forwarded to a sink
    pub annotate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            announce: AnnounceConfig::default(),
            target_fps: None,
            progress_interval: 30,
            annotate: false,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, overlaid by `path` if given and then by the environment
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        Self::load_layered(path, Self::environment())
    }

    /// `WAYGUIDE_*` variables, `__` separating nested keys
    fn environment() -> ::config::Environment {
        ::config::Environment::with_prefix("WAYGUIDE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(
        path: Option<&Path>,
        environment: ::config::Environment,
    ) -> Result<Self, PipelineError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        builder = builder.add_source(environment);

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        info!("Loaded pipeline configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.announce
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if let Some(fps) = self.target_fps {
            if !(fps > 0.0 && fps.is_finite()) {
                return Err(PipelineError::Config(format!(
                    "target_fps must be positive, got {}",
                    fps
                )));
            }
        }
        if self.progress_interval == 0 {
            return Err(PipelineError::Config(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.announce.reannounce_window, 120);
        assert_eq!(config.announce.confidence_threshold, 0.7);
        assert_eq!(config.target_fps, None);
        assert_eq!(config.progress_interval, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wayguide.toml");
        std::fs::write(
            &path,
            "target_fps = 10.0\n\n[announce]\nreannounce_window = 60\n",
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.target_fps, Some(10.0));
        assert_eq!(config.announce.reannounce_window, 60);
        assert_eq!(config.announce.confidence_threshold, 0.7);
        assert_eq!(config.progress_interval, 30);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wayguide.toml");
        std::fs::write(
            &path,
            "target_fps = 10.0\n\n[announce]\nreannounce_window = 60\n",
        )
        .unwrap();

        let mut vars = ::config::Map::new();
        vars.insert(
            "WAYGUIDE_ANNOUNCE__REANNOUNCE_WINDOW".to_string(),
            "90".to_string(),
        );
        vars.insert("WAYGUIDE_PROGRESS_INTERVAL".to_string(), "15".to_string());
        let environment = PipelineConfig::environment().source(Some(vars));

        let config = PipelineConfig::load_layered(Some(&path), environment).unwrap();
        assert_eq!(config.announce.reannounce_window, 90);
        assert_eq!(config.progress_interval, 15);
        // untouched by the environment
        assert_eq!(config.target_fps, Some(10.0));
        assert_eq!(config.announce.confidence_threshold, 0.7);
    }

    #[test]
    fn test_invalid_environment_value_rejected() {
        let mut vars = ::config::Map::new();
        vars.insert(
            "WAYGUIDE_ANNOUNCE__REANNOUNCE_WINDOW".to_string(),
            "0".to_string(),
        );
        let environment = PipelineConfig::environment().source(Some(vars));
        assert!(matches!(
            PipelineConfig::load_layered(None, environment),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "progress_interval = 0\n").unwrap();
        assert!(matches!(
            PipelineConfig::load(Some(&path)),
            Err(PipelineError::Config(_))
        ));

        let config = PipelineConfig {
            target_fps: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = PipelineConfig::load(Some(Path::new("/nonexistent/wayguide.toml")));
        assert!(matches!(result, Err(PipelineError::Settings(_))));
    }
}
