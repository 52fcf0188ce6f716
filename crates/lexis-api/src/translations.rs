use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use lexis_types::api::{
    BulkTranslateRequest, CheckTranslationsQuery, CheckTranslationsResponse, Claims,
    CreateTranslationRequest, MultiTranslateRequest, SuccessResponse, SuggestTranslationsRequest,
    SuggestTranslationsResponse, TranslateOutcome, UpdateTranslationRequest,
    WordTranslationsDashboard, WordTranslationsQuery,
};
use lexis_types::models::TranslationEdge;

use crate::error::ApiResult;
use crate::extract::{Id, Params, Payload};
use crate::state::{AppState, with_db};

pub async fn create_translation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Payload(req): Payload<CreateTranslationRequest>,
) -> ApiResult<impl IntoResponse> {
    let edge = with_db(&state, move |db| db.create_translation(&slug, &req)).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

pub async fn update_translation(
    State(state): State<AppState>,
    Id(id): Id,
    Payload(req): Payload<UpdateTranslationRequest>,
) -> ApiResult<Json<TranslationEdge>> {
    let edge = with_db(&state, move |db| db.update_translation(id, &req)).await?;
    Ok(Json(edge))
}

pub async fn delete_translation(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<SuccessResponse>> {
    with_db(&state, move |db| db.delete_translation(id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn multi_translate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Payload(req): Payload<MultiTranslateRequest>,
) -> ApiResult<Json<TranslateOutcome>> {
    let outcome = with_db(&state, move |db| {
        db.multi_translate(&slug, &req.translations, Some(claims.sub))
    })
    .await?;
    Ok(Json(outcome))
}

pub async fn bulk_translate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Payload(req): Payload<BulkTranslateRequest>,
) -> ApiResult<Json<TranslateOutcome>> {
    let items = req.items.len();
    let outcome =
        with_db(&state, move |db| db.bulk_translate(&req.items, Some(claims.sub))).await?;
    info!("{} submitted {} bulk translation item(s)", claims.username, items);
    Ok(Json(outcome))
}

pub async fn suggest_translations(
    State(state): State<AppState>,
    Payload(req): Payload<SuggestTranslationsRequest>,
) -> ApiResult<Json<SuggestTranslationsResponse>> {
    let suggestions = with_db(&state, move |db| {
        db.suggest_translations(&req.word_ids, &req.target_languages)
    })
    .await?;
    Ok(Json(SuggestTranslationsResponse { suggestions }))
}

pub async fn word_translations(
    State(state): State<AppState>,
    Params(query): Params<WordTranslationsQuery>,
) -> ApiResult<Json<WordTranslationsDashboard>> {
    let dashboard = with_db(&state, move |db| db.word_translations_dashboard(&query)).await?;
    Ok(Json(dashboard))
}

pub async fn check_translations(
    State(state): State<AppState>,
    Params(query): Params<CheckTranslationsQuery>,
) -> ApiResult<Json<CheckTranslationsResponse>> {
    let word = query.word.unwrap_or_default();
    let language = query.language.unwrap_or_default();
    let found = with_db(&state, move |db| db.check_translations(&word, &language)).await?;
    Ok(Json(found))
}
