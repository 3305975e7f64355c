use crate::domain::model::AreaUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilData {
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
    pub moisture: Option<String>,
    pub nutrients: Option<String>,
    pub area: f64,
    pub unit: AreaUnit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmData {
    pub area: f64,
    pub unit: AreaUnit,
    pub crop: Option<String>,
    pub soil_type: Option<String>,
    pub climate: Option<String>,
}

impl SoilData {
    pub fn prompt(&self) -> String {
        let ph = self
            .ph
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Analyze this soil data for farming: \
             pH: {}, Moisture: {}, Nutrients: {}, Area: {} {}. \
             Provide recommendations for crop selection and soil improvement.",
            ph,
            self.moisture.as_deref().unwrap_or("unknown"),
            self.nutrients.as_deref().unwrap_or("unknown"),
            self.area,
            self.unit
        )
    }
}

impl FarmData {
    pub fn prompt(&self) -> String {
        format!(
            "Based on this farm data, predict the potential crop yield:\n\
             Area: {} {}\n\
             Crop: {}\n\
             Soil Type: {}\n\
             Climate: {}\n\
             Provide yield estimates and farming recommendations.",
            self.area,
            self.unit,
            self.crop.as_deref().unwrap_or("general crops"),
            self.soil_type.as_deref().unwrap_or("mixed"),
            self.climate.as_deref().unwrap_or("moderate")
        )
    }
}

/// 推論結果。呼叫端必須檢查 `success`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<serde_json::Value>,
}

impl PredictionResult {
    pub fn succeeded(data: String, prediction: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            prediction: Some(prediction),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            prediction: None,
        }
    }
}
