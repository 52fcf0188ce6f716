use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use lexis_db::filter::{WordFilter, parse_page};
use lexis_types::api::{
    Claims, DisplayQuery, Page, StatusChangeRequest, StatusChangeResponse, SuccessResponse, SuggestQuery,
    Suggestion, WordDetailResponse, WordHistoryResponse, WordListQuery, WordPayload, WordSummary,
};
use lexis_types::models::Word;

use crate::error::ApiResult;
use crate::extract::{Params, Payload};
use crate::middleware::Viewer;
use crate::state::{AppState, with_db};

/// Published words for readers; every non-deleted word for staff.
pub async fn list_words(
    State(state): State<AppState>,
    viewer: Viewer,
    Params(query): Params<WordListQuery>,
) -> ApiResult<Json<Page<WordSummary>>> {
    let filter = WordFilter::from_query(&query, viewer.elevated());
    let page = parse_page(query.page.as_deref());
    let search = query.q.clone().filter(|q| !q.trim().is_empty());
    let user_id = viewer.user_id();

    let words = with_db(&state, move |db| {
        if let (Some(user_id), Some(q)) = (user_id, &search) {
            if let Err(e) = db.record_search(user_id, q) {
                warn!("Failed to record search for user {}: {}", user_id, e);
            }
        }
        db.list_words(&filter, page)
    })
    .await?;
    Ok(Json(words))
}

pub async fn suggest_words(
    State(state): State<AppState>,
    Params(query): Params<SuggestQuery>,
) -> ApiResult<Json<Vec<Suggestion>>> {
    let q = query.q.unwrap_or_default();
    let lang = query.lang.filter(|l| !l.trim().is_empty());
    let suggestions = with_db(&state, move |db| db.suggest_words(&q, lang.as_deref())).await?;
    Ok(Json(suggestions))
}

pub async fn create_word(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Payload(payload): Payload<WordPayload>,
) -> ApiResult<impl IntoResponse> {
    let word = with_db(&state, move |db| db.create_word(&payload, Some(claims.sub))).await?;
    info!("Word {} created by {}", word.slug, claims.username);
    Ok((StatusCode::CREATED, Json(word)))
}

pub async fn word_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    Params(display): Params<DisplayQuery>,
) -> ApiResult<Json<WordDetailResponse>> {
    let elevated = viewer.elevated();
    let language = state.display_language(display.lang.as_deref());
    let detail = with_db(&state, move |db| db.word_detail(&slug, elevated, &language)).await?;
    Ok(Json(detail))
}

pub async fn update_word(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Payload(payload): Payload<WordPayload>,
) -> ApiResult<Json<Word>> {
    let word = with_db(&state, move |db| db.update_word(&slug, &payload, Some(claims.sub))).await?;
    Ok(Json(word))
}

pub async fn delete_word(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    with_db(&state, move |db| db.soft_delete_word(&slug, Some(claims.sub))).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn change_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Payload(req): Payload<StatusChangeRequest>,
) -> ApiResult<Json<StatusChangeResponse>> {
    let change = with_db(&state, move |db| db.change_status(&slug, &req.status, Some(claims.sub)))
        .await?;
    Ok(Json(StatusChangeResponse {
        success: true,
        new_status: change.new,
        new_status_display: change.new.label().to_string(),
        message: format!(
            "Status changed from {} to {}",
            change.old.label(),
            change.new.label()
        ),
    }))
}

pub async fn word_history(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<WordHistoryResponse>> {
    let history = with_db(&state, move |db| db.word_history(&slug)).await?;
    Ok(Json(history))
}
