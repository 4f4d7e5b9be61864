use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::lottery::{LotteryService, LotterySummary};

pub async fn run_lottery(
    State(service): State<Arc<LotteryService>>,
) -> Result<Json<LotterySummary>, AppError> {
    Ok(Json(service.run_lottery().await?))
}
