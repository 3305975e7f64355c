pub mod client;

pub use crate::domain::inference::{FarmData, PredictionResult, SoilData};
pub use client::{InferenceSettings, PredictionClient};
