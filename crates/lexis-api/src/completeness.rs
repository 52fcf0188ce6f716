use axum::{Json, extract::State};

use lexis_db::completeness::{EntityKind, FillTarget};
use lexis_types::api::{
    BulkFillRequest, FillMissingRequest, FillResponse, LanguageProgress, TranslationDashboard,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::Payload;
use crate::state::{AppState, with_db};

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<TranslationDashboard>> {
    let dashboard = with_db(&state, |db| db.translation_dashboard()).await?;
    Ok(Json(dashboard))
}

pub async fn progress(State(state): State<AppState>) -> ApiResult<Json<Vec<LanguageProgress>>> {
    let progress = with_db(&state, |db| db.language_progress()).await?;
    Ok(Json(progress))
}

pub async fn fill_missing(
    State(state): State<AppState>,
    Payload(req): Payload<FillMissingRequest>,
) -> ApiResult<Json<FillResponse>> {
    let kind: EntityKind = req
        .kind
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid type".into()))?;
    let id = req.id;
    let created = with_db(&state, move |db| db.fill_missing(kind, id)).await?;
    Ok(Json(fill_response(created)))
}

pub async fn bulk_fill(
    State(state): State<AppState>,
    Payload(req): Payload<BulkFillRequest>,
) -> ApiResult<Json<FillResponse>> {
    let target: FillTarget = req
        .kind
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid type".into()))?;
    let created = with_db(&state, move |db| db.bulk_fill(target)).await?;
    Ok(Json(fill_response(created)))
}

fn fill_response(created: u32) -> FillResponse {
    FillResponse {
        success: true,
        created_count: created,
        message: format!("Created {created} translation(s)"),
    }
}
