use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use secret_santa_database::models::Participant;

use crate::error::AppError;
use crate::registration::{RegisterRequest, RegistrationService};

pub async fn register(
    State(service): State<Arc<RegistrationService>>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<Participant>), AppError> {
    let participant = service.register(&request).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}
