use crate::core::export::{ExportDocument, FarmExporter};
use crate::core::session::DrawingSession;
use crate::core::store::FarmProfileStore;
use crate::domain::inference::{FarmData, PredictionResult, SoilData};
use crate::domain::model::{AreaUnit, BoundaryPath, FarmProfile};
use crate::domain::ports::{PredictionApi, Storage};
use crate::utils::error::{FarmError, Result};

#[derive(Debug, Clone, Default)]
pub struct CalculationRequest {
    pub boundary: BoundaryPath,
    pub unit: AreaUnit,
    pub name: String,
    pub description: Option<String>,
    pub save: bool,
    pub archive: bool,
    pub analyze_soil: bool,
    pub predict_yield: bool,
    pub crop: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CalculationReport {
    pub area: f64,
    pub unit: AreaUnit,
    pub points: usize,
    pub saved: Option<FarmProfile>,
    pub exported: Vec<String>,
    pub soil_analysis: Option<PredictionResult>,
    pub yield_prediction: Option<PredictionResult>,
}

/// 串接繪圖、存檔、匯出與推論的流程
pub struct CalculatorEngine<S: Storage> {
    exporter: FarmExporter<S>,
    store: FarmProfileStore,
    predictions: Option<Box<dyn PredictionApi>>,
}

impl<S: Storage> CalculatorEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            exporter: FarmExporter::new(storage),
            store: FarmProfileStore::new(),
            predictions: None,
        }
    }

    pub fn with_predictions(mut self, api: Box<dyn PredictionApi>) -> Self {
        self.predictions = Some(api);
        self
    }

    pub fn store(&self) -> &FarmProfileStore {
        &self.store
    }

    pub async fn run(&mut self, request: CalculationRequest) -> Result<CalculationReport> {
        tracing::info!("Starting area calculation");

        // 繪製邊界
        let mut session = DrawingSession::new(request.unit);
        session.start();
        for point in request.boundary.iter() {
            session.add_point(*point);
        }
        let area = session.finish();
        session.set_name(request.name.clone());
        session.set_description(request.description.clone());

        if !session.path().is_closed_area() {
            tracing::warn!(
                "Boundary has only {} points, area is 0",
                session.path().len()
            );
        }
        tracing::info!(
            "📐 Area: {:.2} {} from {} points",
            area,
            session.unit(),
            session.path().len()
        );

        // 存檔
        let saved = if request.save {
            Some(session.save_to(&mut self.store)?)
        } else {
            None
        };

        // 匯出
        let document = match &saved {
            Some(profile) => ExportDocument::from_profile(profile),
            None => session.export(),
        };
        let mut exported = vec![self.exporter.write_document(&document).await?];
        if request.archive {
            let bundle = session.export_all(&self.store);
            exported.push(self.exporter.write_archive(&bundle).await?);
        }

        // 推論
        let soil_analysis = if request.analyze_soil {
            let soil = SoilData {
                area,
                unit: session.unit(),
                ..Default::default()
            };
            Some(self.prediction_api()?.analyze_soil(&soil).await)
        } else {
            None
        };

        let yield_prediction = if request.predict_yield {
            let farm = FarmData {
                area,
                unit: session.unit(),
                crop: request.crop.clone(),
                ..Default::default()
            };
            Some(self.prediction_api()?.predict_yield(&farm).await)
        } else {
            None
        };

        Ok(CalculationReport {
            area,
            unit: session.unit(),
            points: session.path().len(),
            saved,
            exported,
            soil_analysis,
            yield_prediction,
        })
    }

    fn prediction_api(&self) -> Result<&dyn PredictionApi> {
        self.predictions
            .as_deref()
            .ok_or_else(|| FarmError::MissingConfigError {
                field: "api_token".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().unwrap();
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockPredictions {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PredictionApi for MockPredictions {
        async fn analyze_soil(&self, soil: &SoilData) -> PredictionResult {
            self.prompts.lock().unwrap().push(soil.prompt());
            PredictionResult::succeeded("loamy".to_string(), serde_json::json!({}))
        }

        async fn predict_yield(&self, farm: &FarmData) -> PredictionResult {
            self.prompts.lock().unwrap().push(farm.prompt());
            PredictionResult::failed("Prediction timed out")
        }
    }

    fn square_request() -> CalculationRequest {
        CalculationRequest {
            boundary: BoundaryPath::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
            unit: AreaUnit::Hectares,
            name: "Lower Field".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_exports_draft() {
        let storage = MockStorage::default();
        let mut engine = CalculatorEngine::new(storage.clone());

        let report = engine.run(square_request()).await.unwrap();

        assert_eq!(report.points, 4);
        assert_eq!(report.area, 111_320.0 * 111_320.0 / 10000.0);
        assert!(report.saved.is_none());
        assert_eq!(report.exported, vec!["Lower Field.json"]);
        assert!(storage.files.lock().unwrap().contains_key("Lower Field.json"));
        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_run_saves_and_archives() {
        let storage = MockStorage::default();
        let mut engine = CalculatorEngine::new(storage.clone());

        let report = engine
            .run(CalculationRequest {
                save: true,
                archive: true,
                ..square_request()
            })
            .await
            .unwrap();

        let saved = report.saved.unwrap();
        assert_eq!(saved.area, report.area);
        assert_eq!(engine.store().len(), 1);
        assert_eq!(report.exported, vec!["Lower Field.json", "farm-data.zip"]);
    }

    #[tokio::test]
    async fn test_run_save_rejects_short_boundary() {
        let mut engine = CalculatorEngine::new(MockStorage::default());
        let result = engine
            .run(CalculationRequest {
                boundary: BoundaryPath::from(vec![(0.0, 0.0), (1.0, 1.0)]),
                save: true,
                ..square_request()
            })
            .await;

        assert!(matches!(result, Err(FarmError::ValidationError { .. })));
        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_injected_predictions() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let mut engine = CalculatorEngine::new(MockStorage::default()).with_predictions(Box::new(
            MockPredictions {
                prompts: prompts.clone(),
            },
        ));

        let report = engine
            .run(CalculationRequest {
                analyze_soil: true,
                predict_yield: true,
                crop: Some("wheat".to_string()),
                ..square_request()
            })
            .await
            .unwrap();

        assert!(report.soil_analysis.unwrap().success);
        let prediction = report.yield_prediction.unwrap();
        assert!(!prediction.success);
        assert_eq!(prediction.error.as_deref(), Some("Prediction timed out"));

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("hectares"));
        assert!(prompts[1].contains("Crop: wheat"));
    }

    #[tokio::test]
    async fn test_inference_without_client_is_config_error() {
        let mut engine = CalculatorEngine::new(MockStorage::default());
        let result = engine
            .run(CalculationRequest {
                analyze_soil: true,
                ..square_request()
            })
            .await;

        assert!(matches!(result, Err(FarmError::MissingConfigError { .. })));
    }
}
