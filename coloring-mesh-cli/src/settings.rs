use anyhow::{Context, Result};
use coloring_mesh_core::prelude::*;
use coloring_mesh_image::GenerateMaskSettings;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

use crate::cli::{CommonArgs, DensityArgs};

/// Contents of `--settings` file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub mask: GenerateMaskSettings,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub controller: ControllerSettings,
}

impl SessionSettings {
    /// Loads settings file if given and applies command line overrides.
    pub fn resolve(common: &CommonArgs, density: Option<&DensityArgs>) -> Result<Self> {
        let mut result = match &common.settings {
            Some(path) => load(path)?,
            None => Self::default(),
        };
        if let Some(source) = common.mask_source {
            result.mask.source = source.into();
        }
        if let Some(threshold) = common.threshold {
            result.mask.threshold = threshold;
        }
        if common.invert {
            result.mask.invert = true;
        }
        if let Some(density) = density {
            if let Some(points) = density.points {
                result.density.boundary_points = points;
            }
            if let Some(value) = density.density {
                result.density.interior_density = value;
            }
        }
        Ok(result)
    }
}

/// Reads JSON file when it has `.json` extension, YAML otherwise.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        read_to_string(path).with_context(|| format!("Cannot read file {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Cannot parse JSON file {}", path.display()))
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Cannot parse YAML file {}", path.display()))
    }
}
