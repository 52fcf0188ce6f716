use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::middleware::{require_auth, require_staff};
use crate::state::AppState;
use crate::{auth, catalog, completeness, entities, interactions, translations, words};

/// The full HTTP surface. Reads are public; interactions need a token;
/// everything that edits the dictionary needs a staff or moderator token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/api/site", get(catalog::site_info))
        .route("/api/languages", get(catalog::list_languages))
        .route("/api/words", get(words::list_words))
        .route("/api/words/{slug}", get(words::word_detail))
        .route("/api/check-translations", get(translations::check_translations))
        .route("/api/categories", get(entities::list_categories))
        .route("/api/categories/{id}", get(entities::get_category))
        .route("/api/categories/{id}/translations", get(entities::category_translations))
        .route("/api/tags", get(entities::list_tags))
        .route("/api/tags/{id}", get(entities::get_tag))
        .route("/api/tags/{id}/translations", get(entities::tag_translations))
        .route("/api/interface-translations", get(catalog::interface_grid))
        .route("/api/translations/dashboard", get(completeness::dashboard))
        .route("/api/translations/progress", get(completeness::progress));

    let member_routes = Router::new()
        .route("/api/words/{slug}/examples", post(interactions::add_example))
        .route("/api/words/{slug}/favourite", post(interactions::toggle_favourite))
        .route("/api/words/{slug}/like", post(interactions::like))
        .route("/api/me/favourites", get(interactions::my_favourites))
        .route("/api/me/searches", get(interactions::my_searches))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let staff_routes = Router::new()
        .route("/api/languages", post(catalog::create_language))
        .route("/api/words", post(words::create_word))
        .route("/api/words/suggest", get(words::suggest_words))
        .route("/api/words/{slug}", put(words::update_word).delete(words::delete_word))
        .route("/api/words/{slug}/status", post(words::change_status))
        .route("/api/words/{slug}/history", get(words::word_history))
        .route("/api/words/{slug}/translations", post(translations::create_translation))
        .route("/api/words/{slug}/multi-translate", post(translations::multi_translate))
        .route(
            "/api/translations/{id}",
            put(translations::update_translation).delete(translations::delete_translation),
        )
        .route("/api/word-translations", get(translations::word_translations))
        .route("/api/word-translations/bulk", post(translations::bulk_translate))
        .route("/api/word-translations/suggest", post(translations::suggest_translations))
        .route("/api/categories", post(entities::create_category))
        .route(
            "/api/categories/{id}",
            put(entities::update_category).delete(entities::delete_category),
        )
        .route(
            "/api/categories/{id}/translations",
            put(entities::update_category_translations),
        )
        .route("/api/tags", post(entities::create_tag))
        .route("/api/tags/{id}", put(entities::update_tag).delete(entities::delete_tag))
        .route("/api/tags/{id}/translations", put(entities::update_tag_translations))
        .route("/api/interface-translations", put(catalog::update_interface))
        .route("/api/translations/missing", post(completeness::fill_missing))
        .route("/api/translations/bulk-fill", post(completeness::bulk_fill))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(staff_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
