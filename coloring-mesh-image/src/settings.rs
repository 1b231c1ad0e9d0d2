use coloring_mesh_core::Scalar;
use serde::{Deserialize, Serialize};

/// Source image channel used as foreground mask values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskSource {
    /// Luminosity.
    Luma,
    /// Luminosity * Alpha.
    #[default]
    LumaAlpha,
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
    /// Alpha channel.
    Alpha,
}

/// Settings of foreground mask generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateMaskSettings {
    /// Image channel source.
    #[serde(default)]
    pub source: MaskSource,
    /// Normalized channel values strictly above it are foreground.
    #[serde(default = "GenerateMaskSettings::default_threshold")]
    pub threshold: Scalar,
    /// Inverts channel values before thresholding (dark drawing on light paper).
    #[serde(default)]
    pub invert: bool,
}

impl Default for GenerateMaskSettings {
    fn default() -> Self {
        Self {
            source: MaskSource::default(),
            threshold: Self::default_threshold(),
            invert: false,
        }
    }
}

impl GenerateMaskSettings {
    fn default_threshold() -> Scalar {
        0.5
    }
}
