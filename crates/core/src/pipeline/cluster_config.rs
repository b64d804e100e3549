use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::domain::extras_resolver::SharedFaceMatching;
use crate::identity::domain::identity_resolver::IdentityResolver;
use crate::identity::infrastructure::dbscan_identity_resolver::DbscanIdentityResolver;
use crate::identity::infrastructure::greedy_anchor_resolver::GreedyAnchorResolver;
use crate::shared::constants::{
    EXTRAS_RATIO, IDENTITY_EPSILON, MATCH_THRESHOLD, MIN_IDENTITY_SIZE, OUTFIT_THRESHOLD,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("identity epsilon must be in (0, 2], got {0}")]
    IdentityEpsilon(f64),
    #[error("minimum identity size must be at least 1")]
    MinIdentitySize,
    #[error("{name} must be between -1.0 and 1.0, got {value}")]
    SimilarityThreshold { name: &'static str, value: f64 },
    #[error("outfit threshold must be non-negative, got {0}")]
    OutfitThreshold(f64),
    #[error("extras ratio must be in (0, 1], got {0}")]
    ExtrasRatio(f64),
    #[error("maximum batch size must be at least 1")]
    MaxBatchSize,
    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Which identity resolver a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    #[default]
    Dbscan,
    GreedyAnchor,
}

impl std::fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverKind::Dbscan => write!(f, "dbscan"),
            ResolverKind::GreedyAnchor => write!(f, "greedy_anchor"),
        }
    }
}

/// Tunable thresholds for one clustering run. Defaults are the reference values.
///
/// `max_batch_size` is unset by default: the engine accepts any batch, and
/// callers that want bounded latency set a cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub resolver: ResolverKind,
    pub identity_epsilon: f64,
    pub min_identity_size: usize,
    pub anchor_threshold: f64,
    pub outfit_threshold: f64,
    pub extras_ratio: f64,
    pub extras_matching: SharedFaceMatching,
    pub match_threshold: f64,
    pub max_batch_size: Option<usize>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::default(),
            identity_epsilon: IDENTITY_EPSILON,
            min_identity_size: MIN_IDENTITY_SIZE,
            anchor_threshold: MATCH_THRESHOLD,
            outfit_threshold: OUTFIT_THRESHOLD,
            extras_ratio: EXTRAS_RATIO,
            extras_matching: SharedFaceMatching::default(),
            match_threshold: MATCH_THRESHOLD,
            max_batch_size: None,
        }
    }
}

impl ClusterConfig {
    /// Reads a JSON config. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.identity_epsilon > 0.0 && self.identity_epsilon <= 2.0) {
            return Err(ConfigError::IdentityEpsilon(self.identity_epsilon));
        }
        if self.min_identity_size == 0 {
            return Err(ConfigError::MinIdentitySize);
        }
        check_similarity("anchor threshold", self.anchor_threshold)?;
        check_similarity("match threshold", self.match_threshold)?;
        if !(self.outfit_threshold >= 0.0) {
            return Err(ConfigError::OutfitThreshold(self.outfit_threshold));
        }
        if !(self.extras_ratio > 0.0 && self.extras_ratio <= 1.0) {
            return Err(ConfigError::ExtrasRatio(self.extras_ratio));
        }
        if self.max_batch_size == Some(0) {
            return Err(ConfigError::MaxBatchSize);
        }
        Ok(())
    }

    pub fn build_resolver(&self) -> Box<dyn IdentityResolver> {
        match self.resolver {
            ResolverKind::Dbscan => Box::new(DbscanIdentityResolver::new(
                self.identity_epsilon,
                self.min_identity_size,
            )),
            ResolverKind::GreedyAnchor => Box::new(GreedyAnchorResolver::new(self.anchor_threshold)),
        }
    }
}

fn check_similarity(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::SimilarityThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(ClusterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_thresholds_agree() {
        let config = ClusterConfig::default();
        approx::assert_relative_eq!(
            1.0 - config.identity_epsilon,
            config.match_threshold,
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(ClusterConfig { identity_epsilon: 0.0, ..Default::default() }, ConfigError::IdentityEpsilon(0.0))]
    #[case(ClusterConfig { identity_epsilon: 2.5, ..Default::default() }, ConfigError::IdentityEpsilon(2.5))]
    #[case(ClusterConfig { min_identity_size: 0, ..Default::default() }, ConfigError::MinIdentitySize)]
    #[case(ClusterConfig { outfit_threshold: -1.0, ..Default::default() }, ConfigError::OutfitThreshold(-1.0))]
    #[case(ClusterConfig { extras_ratio: 0.0, ..Default::default() }, ConfigError::ExtrasRatio(0.0))]
    #[case(ClusterConfig { extras_ratio: 1.5, ..Default::default() }, ConfigError::ExtrasRatio(1.5))]
    #[case(ClusterConfig { max_batch_size: Some(0), ..Default::default() }, ConfigError::MaxBatchSize)]
    #[case(
        ClusterConfig { match_threshold: 1.2, ..Default::default() },
        ConfigError::SimilarityThreshold { name: "match threshold", value: 1.2 }
    )]
    fn test_validate_rejects(#[case] config: ClusterConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn test_default_has_no_batch_cap() {
        assert_eq!(ClusterConfig::default().max_batch_size, None);
    }

    #[test]
    fn test_capped_batch_is_valid() {
        let config = ClusterConfig {
            max_batch_size: Some(20),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolver_kind_display_matches_serde_name() {
        for kind in [ResolverKind::Dbscan, ResolverKind::GreedyAnchor] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"outfit_threshold": 25.0, "extras_matching": "cosine"}}"#).unwrap();

        let config = ClusterConfig::load(file.path()).unwrap();

        assert_eq!(config.outfit_threshold, 25.0);
        assert_eq!(config.extras_matching, SharedFaceMatching::Cosine);
        assert_eq!(config.identity_epsilon, IDENTITY_EPSILON);
        assert_eq!(config.max_batch_size, None);
    }

    #[test]
    fn test_load_round_trips_saved_config() {
        let config = ClusterConfig {
            resolver: ResolverKind::GreedyAnchor,
            max_batch_size: Some(5),
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&config).unwrap().as_bytes())
            .unwrap();

        assert_eq!(ClusterConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"extras_ratio": 0.0}}"#).unwrap();
        assert_eq!(
            ClusterConfig::load(file.path()),
            Err(ConfigError::ExtrasRatio(0.0))
        );
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ClusterConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClusterConfig::load(Path::new("/nonexistent/cluster.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_build_resolver_follows_kind() {
        let config = ClusterConfig::default();
        assert_eq!(config.build_resolver().name(), "dbscan");
        let config = ClusterConfig {
            resolver: ResolverKind::GreedyAnchor,
            ..Default::default()
        };
        assert_eq!(config.build_resolver().name(), "greedy_anchor");
    }
}
