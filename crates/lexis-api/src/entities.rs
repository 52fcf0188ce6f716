//! Category and tag endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use lexis_types::api::{
    CategoryRequest, CategoryResponse, DisplayQuery, EntityTranslations, SuccessResponse,
    TagRequest, TagResponse, UpdateEntityTranslationsRequest,
};

use crate::error::ApiResult;
use crate::extract::{Id, Params, Payload};
use crate::state::{AppState, with_db};

// -- Categories --

pub async fn list_categories(
    State(state): State<AppState>,
    Params(display): Params<DisplayQuery>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let language = state.display_language(display.lang.as_deref());
    let categories = with_db(&state, move |db| db.list_categories(&language)).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Id(id): Id,
    Params(display): Params<DisplayQuery>,
) -> ApiResult<Json<CategoryResponse>> {
    let language = state.display_language(display.lang.as_deref());
    let category = with_db(&state, move |db| db.get_category(id, &language)).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Payload(req): Payload<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let language = state.display_language(None);
    let category = with_db(&state, move |db| db.create_category(&req, &language)).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Id(id): Id,
    Payload(req): Payload<CategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let language = state.display_language(None);
    let category = with_db(&state, move |db| db.update_category(id, &req, &language)).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<SuccessResponse>> {
    with_db(&state, move |db| db.delete_category(id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn category_translations(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<EntityTranslations>> {
    let names = with_db(&state, move |db| db.category_translations(id)).await?;
    Ok(Json(names))
}

pub async fn update_category_translations(
    State(state): State<AppState>,
    Id(id): Id,
    Payload(req): Payload<UpdateEntityTranslationsRequest>,
) -> ApiResult<Json<EntityTranslations>> {
    let names = with_db(&state, move |db| db.update_category_translations(id, &req)).await?;
    Ok(Json(names))
}

// -- Tags --

pub async fn list_tags(
    State(state): State<AppState>,
    Params(display): Params<DisplayQuery>,
) -> ApiResult<Json<Vec<TagResponse>>> {
    let language = state.display_language(display.lang.as_deref());
    let tags = with_db(&state, move |db| db.list_tags(&language)).await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Id(id): Id,
    Params(display): Params<DisplayQuery>,
) -> ApiResult<Json<TagResponse>> {
    let language = state.display_language(display.lang.as_deref());
    let tag = with_db(&state, move |db| db.get_tag(id, &language)).await?;
    Ok(Json(tag))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Payload(req): Payload<TagRequest>,
) -> ApiResult<impl IntoResponse> {
    let language = state.display_language(None);
    let tag = with_db(&state, move |db| db.create_tag(&req, &language)).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Id(id): Id,
    Payload(req): Payload<TagRequest>,
) -> ApiResult<Json<TagResponse>> {
    let language = state.display_language(None);
    let tag = with_db(&state, move |db| db.update_tag(id, &req, &language)).await?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<SuccessResponse>> {
    with_db(&state, move |db| db.delete_tag(id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn tag_translations(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<EntityTranslations>> {
    let names = with_db(&state, move |db| db.tag_translations(id)).await?;
    Ok(Json(names))
}

pub async fn update_tag_translations(
    State(state): State<AppState>,
    Id(id): Id,
    Payload(req): Payload<UpdateEntityTranslationsRequest>,
) -> ApiResult<Json<EntityTranslations>> {
    let names = with_db(&state, move |db| db.update_tag_translations(id, &req)).await?;
    Ok(Json(names))
}
