use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use lexis_types::api::{
    Claims, ExampleRequest, FavouriteResponse, LikeRequest, LikeResponse, WordSummary,
};
use lexis_types::models::SearchRecord;

use crate::error::ApiResult;
use crate::extract::Payload;
use crate::state::{AppState, with_db};

pub async fn add_example(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Payload(req): Payload<ExampleRequest>,
) -> ApiResult<impl IntoResponse> {
    let example = with_db(&state, move |db| db.add_example(&slug, &req.text, Some(claims.sub)))
        .await?;
    Ok((StatusCode::CREATED, Json(example)))
}

pub async fn toggle_favourite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> ApiResult<Json<FavouriteResponse>> {
    let favourited = with_db(&state, move |db| db.toggle_favourite(claims.sub, &slug)).await?;
    Ok(Json(FavouriteResponse { favourited }))
}

pub async fn like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Payload(req): Payload<LikeRequest>,
) -> ApiResult<Json<LikeResponse>> {
    let (likes, dislikes) =
        with_db(&state, move |db| db.set_like(claims.sub, &slug, req.is_like)).await?;
    Ok(Json(LikeResponse { likes, dislikes }))
}

pub async fn my_favourites(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<WordSummary>>> {
    let words = with_db(&state, move |db| db.favourites(claims.sub)).await?;
    Ok(Json(words))
}

pub async fn my_searches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<SearchRecord>>> {
    let searches = with_db(&state, move |db| db.recent_searches(claims.sub)).await?;
    Ok(Json(searches))
}
