use lexis_types::api::{EntityTranslations, TagRequest, TagResponse, UpdateEntityTranslationsRequest};

use super::entities::{self, EntityRow, TAG, parse_display_mode};
use crate::{Database, DbResult};

impl From<EntityRow> for TagResponse {
    fn from(row: EntityRow) -> Self {
        TagResponse {
            id: row.id,
            code: row.code,
            slug: row.slug,
            name: row.name,
            display_mode: row.display_mode,
            word_count: row.word_count,
        }
    }
}

impl Database {
    pub fn list_tags(&self, display_language: &str) -> DbResult<Vec<TagResponse>> {
        self.with_conn(|conn| {
            let rows = entities::query_entities(conn, TAG, display_language, None)?;
            Ok(rows.into_iter().map(TagResponse::from).collect())
        })
    }

    pub fn get_tag(&self, id: i64, display_language: &str) -> DbResult<TagResponse> {
        self.with_conn(|conn| entities::require_entity(conn, TAG, id, display_language).map(Into::into))
    }

    pub fn create_tag(&self, request: &TagRequest, display_language: &str) -> DbResult<TagResponse> {
        let mode = parse_display_mode(request.display_mode.as_deref())?.unwrap_or_default();
        self.with_tx(|tx| {
            let id = entities::create_entity(tx, TAG, &request.code, &request.name, "", mode)?;
            entities::require_entity(tx, TAG, id, display_language).map(Into::into)
        })
    }

    pub fn update_tag(
        &self,
        id: i64,
        request: &TagRequest,
        display_language: &str,
    ) -> DbResult<TagResponse> {
        let mode = parse_display_mode(request.display_mode.as_deref())?;
        self.with_tx(|tx| {
            entities::update_entity(tx, TAG, id, &request.code, &request.name, mode)?;
            entities::require_entity(tx, TAG, id, display_language).map(Into::into)
        })
    }

    pub fn delete_tag(&self, id: i64) -> DbResult<()> {
        self.with_tx(|tx| entities::delete_entity(tx, TAG, id))
    }

    pub fn tag_translations(&self, id: i64) -> DbResult<EntityTranslations> {
        self.with_conn(|conn| entities::entity_translations(conn, TAG, id))
    }

    pub fn update_tag_translations(
        &self,
        id: i64,
        request: &UpdateEntityTranslationsRequest,
    ) -> DbResult<EntityTranslations> {
        let mode = parse_display_mode(request.display_mode.as_deref())?;
        self.with_tx(|tx| {
            entities::update_entity_translations(tx, TAG, id, &request.translations, mode)?;
            entities::entity_translations(tx, TAG, id)
        })
    }
}
