//! # Configuration
//!
//! Engine settings, loadable from JSON. Every field has a default, so a
//! partial file only overrides what it names.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxelError};

/// Default settings file name.
pub const CONFIG_FILE_NAME: &str = "voxel_world.json";

/// Tunables of the world and the mesh scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The dirty-chunk queue is drained once per this many ticks.
    pub mesh_rebuild_interval_ticks: u32,
    /// Wall-clock budget of one drain, in milliseconds.
    pub mesh_time_budget_ms: f64,
    /// Lowest chunk coordinate of the initial load, inclusive.
    pub initial_load_min: [i32; 3],
    /// Highest chunk coordinate of the initial load, inclusive.
    pub initial_load_max: [i32; 3],
    /// Also build outline meshes.
    pub generate_line_meshes: bool,
    /// Starting bit width of chunk block storage.
    pub min_palette_bits: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mesh_rebuild_interval_ticks: 10,
            mesh_time_budget_ms: 1000.0 / 144.0,
            initial_load_min: [-3, 0, -3],
            initial_load_max: [3, 1, 3],
            generate_line_meshes: false,
            min_palette_bits: 4,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| VoxelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| VoxelError::Config(format!("{}: {}", path.display(), e)))?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| VoxelError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VoxelError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=32).contains(&self.min_palette_bits) {
            return Err(VoxelError::Config(format!(
                "min_palette_bits must be in [1, 32], got {}",
                self.min_palette_bits
            )));
        }
        if self.mesh_rebuild_interval_ticks == 0 {
            return Err(VoxelError::Config(
                "mesh_rebuild_interval_ticks must be at least 1".to_string(),
            ));
        }
        if !self.mesh_time_budget_ms.is_finite() || self.mesh_time_budget_ms < 0.0 {
            return Err(VoxelError::Config(format!(
                "mesh_time_budget_ms must be a non-negative number, got {}",
                self.mesh_time_budget_ms
            )));
        }

        let (min, max) = (self.initial_load_min, self.initial_load_max);
        if min.iter().zip(max.iter()).any(|(low, high)| low > high) {
            return Err(VoxelError::Config(format!(
                "initial_load_min {:?} exceeds initial_load_max {:?}",
                min, max
            )));
        }

        Ok(())
    }

    pub fn mesh_time_budget(&self) -> Duration {
        Duration::from_secs_f64(self.mesh_time_budget_ms.max(0.0) / 1000.0)
    }

    pub fn initial_load_range(&self) -> (Point3<i32>, Point3<i32>) {
        (
            Point3::from(self.initial_load_min),
            Point3::from(self.initial_load_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_keep_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "generate_line_meshes": true }"#).unwrap();
        assert!(config.generate_line_meshes);
        assert_eq!(config.mesh_rebuild_interval_ticks, 10);
        assert_eq!(
            config.initial_load_range(),
            (Point3::new(-3, 0, -3), Point3::new(3, 1, 3))
        );
    }

    #[test]
    fn defaults_survive_serialization() {
        let config = EngineConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "min_palette_bits": 0 }"#,
            r#"{ "min_palette_bits": 33 }"#,
            r#"{ "mesh_rebuild_interval_ticks": 0 }"#,
            r#"{ "initial_load_min": [0, 2, 0], "initial_load_max": [1, 1, 1] }"#,
            r#"{ "mesh_time_budget_ms": -1.0 }"#,
        ] {
            assert!(
                matches!(EngineConfig::from_json_str(json), Err(VoxelError::Config(_))),
                "{} was accepted",
                json
            );
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ nope"),
            Err(VoxelError::Config(_))
        ));
    }

    #[test]
    fn budget_converts_to_duration() {
        let config = EngineConfig {
            mesh_time_budget_ms: 500.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.mesh_time_budget(), Duration::from_millis(500));
    }
}
