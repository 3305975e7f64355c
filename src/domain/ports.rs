use crate::domain::inference::{FarmData, PredictionResult, SoilData};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 匯出目的地
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 外部推論服務。失敗以 `PredictionResult` 回報而不是 `Err`。
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn analyze_soil(&self, soil: &SoilData) -> PredictionResult;
    async fn predict_yield(&self, farm: &FarmData) -> PredictionResult;
}
