//! Engine configuration loaded from an optional TOML file.
//!
//! ```toml
//! drop_lowest = 0
//!
//! [weights]
//! oral = 1
//! fifteen_min = 1
//! one_period = 2
//! midterm = 2
//! final = 3
//!
//! [cohort]
//! weakness_margin = 1.0
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::grades::{SubjectAggregator, WeightTable};
use crate::report::ReportCompiler;

pub const DEFAULT_WEAKNESS_MARGIN: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CohortConfig {
    /// How far below the class subject mean counts as a weakness.
    pub weakness_margin: f64,
}

impl Default for CohortConfig {
    fn default() -> Self {
        CohortConfig {
            weakness_margin: DEFAULT_WEAKNESS_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub weights: WeightTable,
    /// Lowest scores dropped from homogeneous score lists.
    pub drop_lowest: usize,
    pub cohort: CohortConfig,
}

impl EngineConfig {
    pub fn compiler(&self) -> ReportCompiler {
        ReportCompiler::from_aggregator(
            SubjectAggregator::new(self.weights.clone()).with_drop_lowest(self.drop_lowest),
        )
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw).context("failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(EngineConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let margin = self.cohort.weakness_margin;
        if !margin.is_finite() || margin < 0.0 {
            bail!("cohort.weakness_margin must be a non-negative number, got {margin}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentType;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.weights.weight(ComponentType::Final), Some(3.0));
        assert_eq!(config.cohort.weakness_margin, 1.0);
        assert_eq!(config.drop_lowest, 0);
    }

    #[test]
    fn drop_lowest_reaches_the_aggregator() {
        let config = EngineConfig::from_toml_str("drop_lowest = 2\n").unwrap();
        assert_eq!(config.drop_lowest, 2);
        let compiler = config.compiler();
        assert_eq!(
            compiler
                .aggregator()
                .average_dropping_lowest(&[3.0, 5.0, 8.0, 9.0])
                .unwrap(),
            Some(8.5)
        );
    }

    #[test]
    fn partial_weight_table_replaces_the_default() {
        let config = EngineConfig::from_toml_str(
            r#"
            [weights]
            midterm = 1
            final = 1.5

            [cohort]
            weakness_margin = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.weights.weight(ComponentType::Final), Some(1.5));
        assert_eq!(config.weights.weight(ComponentType::Midterm), Some(1.0));
        assert_eq!(config.weights.weight(ComponentType::Oral), None);
        assert_eq!(config.cohort.weakness_margin, 0.5);
    }

    #[test]
    fn rejects_bad_weights_and_keys() {
        assert!(EngineConfig::from_toml_str("[weights]\noral = 0\n").is_err());
        assert!(EngineConfig::from_toml_str("[weights]\nfinal = -3\n").is_err());
        assert!(EngineConfig::from_toml_str("[weights]\nhomework = 1\n").is_err());
        assert!(EngineConfig::from_toml_str("[cohort]\nweakness_margin = -1.0\n").is_err());
        assert!(EngineConfig::from_toml_str("[grading]\n").is_err());
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(EngineConfig::load(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[cohort]\nweakness_margin = 2.0\n").unwrap();
        let config = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.cohort.weakness_margin, 2.0);
        assert_eq!(config.weights, WeightTable::vietnamese());
    }
}
