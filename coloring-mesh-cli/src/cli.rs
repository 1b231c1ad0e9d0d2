use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use coloring_mesh_core::Scalar;
use coloring_mesh_image::MaskSource;

#[derive(Clone, Debug, Parser)]
#[command(name = "coloring-mesh", version, author, about)]
#[command(help_template = "\
{name} {version}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
pub struct CliArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Clone, Debug, Args)]
pub struct CommonArgs {
    /// Input image file path
    #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
    pub output: PathBuf,

    /// Settings file (YAML or JSON); flags override its values
    #[arg(long, value_name = "PATH", value_hint(ValueHint::FilePath))]
    pub settings: Option<PathBuf>,

    /// Use an alternate channel as foreground mask source
    #[arg(long, value_name = "CHANNEL")]
    pub mask_source: Option<MaskSourceSelection>,

    /// Normalized channel values above it are foreground
    #[arg(long, value_name = "NUMBER")]
    pub threshold: Option<Scalar>,

    /// Invert mask channel values
    #[arg(long)]
    pub invert: bool,

    /// Log debug messages and display settings used
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DensityArgs {
    /// Number of points placed on the contour
    #[arg(long, value_name = "INTEGER")]
    pub points: Option<usize>,

    /// Number of interior grid steps per bounding box axis
    #[arg(long, value_name = "INTEGER")]
    pub density: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, strum::Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum MaskSourceSelection {
    Luma,
    #[default]
    LumaAlpha,
    Red,
    Green,
    Blue,
    Alpha,
}
impl From<MaskSourceSelection> for MaskSource {
    fn from(value: MaskSourceSelection) -> Self {
        use MaskSource as T; // target
        use MaskSourceSelection as S; // source
        match value {
            S::Luma => T::Luma,
            S::LumaAlpha => T::LumaAlpha,
            S::Red => T::Red,
            S::Green => T::Green,
            S::Blue => T::Blue,
            S::Alpha => T::Alpha,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Action {
    /// Produce foreground mask image
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Mask {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Produce coloring mesh
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Mesh {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        density: DensityArgs,

        #[command(flatten)]
        format: Format,
    },

    /// Replay events on coloring mesh and produce painted image
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Paint {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        density: DensityArgs,

        /// Events file (YAML or JSON list)
        #[arg(long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        events: PathBuf,
    },
}

#[derive(Clone, Debug, Args)]
#[group(required = true)]
pub struct Format {
    /// Produce JSON mesh
    #[arg(long)]
    pub json: bool,

    /// Produce pretty JSON mesh
    #[arg(long)]
    pub json_pretty: bool,

    /// Produce YAML mesh
    #[arg(long)]
    pub yaml: bool,

    /// Produce OBJ mesh
    #[arg(long)]
    pub obj: bool,

    /// Produce PNG mesh visualization
    #[arg(long)]
    pub png: bool,
}
