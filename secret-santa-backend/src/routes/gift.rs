use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use secret_santa_database::models::Gift;

use crate::error::AppError;
use crate::registration::{GiftRequest, RegistrationService};

pub async fn save_gift(
    State(service): State<Arc<RegistrationService>>,
    WithRejection(Json(request), _): WithRejection<Json<GiftRequest>, AppError>,
) -> Result<(StatusCode, Json<Gift>), AppError> {
    let gift = service.save_gift(&request).await?;
    Ok((StatusCode::CREATED, Json(gift)))
}
