pub mod config;
pub mod core;
pub mod domain;
pub mod inference;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    area::AreaEngine,
    calculator::{CalculationReport, CalculationRequest, CalculatorEngine},
    export::{ExportDocument, FarmDataExport, FarmExporter},
    poll::BoundedPoll,
    session::{DrawingSession, DrawingState},
    store::FarmProfileStore,
};
pub use crate::domain::model::{AreaUnit, BoundaryPath, Coordinate, FarmProfile, ProfileId};
pub use crate::inference::{InferenceSettings, PredictionClient, PredictionResult};
pub use crate::utils::error::{FarmError, Result};
