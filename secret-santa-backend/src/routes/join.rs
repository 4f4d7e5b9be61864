use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;

use crate::error::AppError;
use crate::registration::{JoinRequest, Joined, RegistrationService};

pub async fn join(
    State(service): State<Arc<RegistrationService>>,
    WithRejection(Json(request), _): WithRejection<Json<JoinRequest>, AppError>,
) -> Result<(StatusCode, Json<Joined>), AppError> {
    let joined = service.join(request).await?;
    Ok((StatusCode::CREATED, Json(joined)))
}
