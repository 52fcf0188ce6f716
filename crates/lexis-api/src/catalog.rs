//! Site metadata, languages and interface strings.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use lexis_types::api::{
    CreateLanguageRequest, InterfaceGrid, SiteInfo, SuccessResponse, UpdateInterfaceRequest,
};
use lexis_types::models::Language;
use lexis_types::site;

use crate::error::ApiResult;
use crate::extract::Payload;
use crate::state::{AppState, with_db};

pub async fn site_info() -> Json<SiteInfo> {
    Json(SiteInfo {
        header: site::SITE_HEADER.to_string(),
        title: site::SITE_TITLE.to_string(),
        index_title: site::INDEX_TITLE.to_string(),
    })
}

pub async fn list_languages(State(state): State<AppState>) -> ApiResult<Json<Vec<Language>>> {
    let languages = with_db(&state, |db| db.list_languages()).await?;
    Ok(Json(languages))
}

pub async fn create_language(
    State(state): State<AppState>,
    Payload(req): Payload<CreateLanguageRequest>,
) -> ApiResult<impl IntoResponse> {
    let language = with_db(&state, move |db| db.create_language(&req.code, &req.name)).await?;
    info!("Language {} added", language.code);
    Ok((StatusCode::CREATED, Json(language)))
}

pub async fn interface_grid(State(state): State<AppState>) -> ApiResult<Json<InterfaceGrid>> {
    let grid = with_db(&state, |db| db.interface_grid()).await?;
    Ok(Json(grid))
}

pub async fn update_interface(
    State(state): State<AppState>,
    Payload(req): Payload<UpdateInterfaceRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let saved = with_db(&state, move |db| db.update_interface(&req.values)).await?;
    info!("{} interface string(s) saved", saved);
    Ok(Json(SuccessResponse { success: true }))
}
