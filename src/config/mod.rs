pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{AreaUnit, BoundaryPath};
#[cfg(feature = "cli")]
use crate::utils::error::{FarmError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_farm_name, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "farm-acreage")]
#[command(about = "Compute farm area from boundary points, save and export farm profiles")]
pub struct CliConfig {
    /// Boundary points as "lat,lng;lat,lng;..."
    #[arg(long, conflicts_with = "boundary_file")]
    pub points: Option<String>,

    /// JSON file containing [{"lat": .., "lng": ..}, ...]
    #[arg(long)]
    pub boundary_file: Option<String>,

    /// Area unit: acres, hectares or sqm (defaults to the config file, then acres)
    #[arg(long)]
    pub unit: Option<AreaUnit>,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Directory for exported documents (defaults to the config file, then ./output)
    #[arg(long)]
    pub output_path: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Save the boundary as a farm profile before exporting")]
    pub save: bool,

    #[arg(long, help = "Write a ZIP archive with the draft and saved profiles")]
    pub archive: bool,

    #[arg(long, help = "Request a soil analysis for the computed area")]
    pub analyze_soil: bool,

    #[arg(long, help = "Request a yield prediction for the computed area")]
    pub predict_yield: bool,

    #[arg(long)]
    pub crop: Option<String>,

    #[arg(long, env = "REPLICATE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON formatted logs")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 讀取邊界：`--points` 或 `--boundary-file`
    pub fn boundary(&self) -> Result<BoundaryPath> {
        match (&self.points, &self.boundary_file) {
            (Some(points), _) => BoundaryPath::parse_points(points),
            (None, Some(path)) => {
                let content = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&content)?)
            }
            (None, None) => Err(FarmError::MissingConfigError {
                field: "points or boundary_file".to_string(),
            }),
        }
    }

    pub fn wants_inference(&self) -> bool {
        self.analyze_soil || self.predict_yield
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.points.is_none() && self.boundary_file.is_none() {
            return Err(FarmError::MissingConfigError {
                field: "points or boundary_file".to_string(),
            });
        }

        if let Some(path) = &self.boundary_file {
            validate_path("boundary_file", path)?;
        }

        if let Some(path) = &self.output_path {
            validate_path("output_path", path)?;
        }

        if self.save {
            validate_farm_name(&self.name)?;
        }

        if self.wants_inference() && self.api_token.as_deref().map_or(true, str::is_empty) {
            return Err(FarmError::MissingConfigError {
                field: "api_token".to_string(),
            });
        }

        Ok(())
    }
}
