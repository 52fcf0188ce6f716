use lexis_types::api::{
    CategoryRequest, CategoryResponse, EntityTranslations, UpdateEntityTranslationsRequest,
};
use lexis_types::models::DisplayMode;

use super::entities::{self, CATEGORY, EntityRow};
use crate::{Database, DbResult};

impl From<EntityRow> for CategoryResponse {
    fn from(row: EntityRow) -> Self {
        CategoryResponse {
            id: row.id,
            code: row.code,
            slug: row.slug,
            name: row.name,
            word_count: row.word_count,
        }
    }
}

impl Database {
    pub fn list_categories(&self, display_language: &str) -> DbResult<Vec<CategoryResponse>> {
        self.with_conn(|conn| {
            let rows = entities::query_entities(conn, CATEGORY, display_language, None)?;
            Ok(rows.into_iter().map(CategoryResponse::from).collect())
        })
    }

    pub fn get_category(&self, id: i64, display_language: &str) -> DbResult<CategoryResponse> {
        self.with_conn(|conn| {
            entities::require_entity(conn, CATEGORY, id, display_language).map(Into::into)
        })
    }

    pub fn create_category(
        &self,
        request: &CategoryRequest,
        display_language: &str,
    ) -> DbResult<CategoryResponse> {
        self.with_tx(|tx| {
            let id = entities::create_entity(
                tx,
                CATEGORY,
                &request.code,
                &request.name,
                &request.description,
                DisplayMode::Visible,
            )?;
            entities::require_entity(tx, CATEGORY, id, display_language).map(Into::into)
        })
    }

    pub fn update_category(
        &self,
        id: i64,
        request: &CategoryRequest,
        display_language: &str,
    ) -> DbResult<CategoryResponse> {
        self.with_tx(|tx| {
            entities::update_entity(tx, CATEGORY, id, &request.code, &request.name, None)?;
            entities::require_entity(tx, CATEGORY, id, display_language).map(Into::into)
        })
    }

    pub fn delete_category(&self, id: i64) -> DbResult<()> {
        self.with_tx(|tx| entities::delete_entity(tx, CATEGORY, id))
    }

    pub fn category_translations(&self, id: i64) -> DbResult<EntityTranslations> {
        self.with_conn(|conn| entities::entity_translations(conn, CATEGORY, id))
    }

    pub fn update_category_translations(
        &self,
        id: i64,
        request: &UpdateEntityTranslationsRequest,
    ) -> DbResult<EntityTranslations> {
        self.with_tx(|tx| {
            entities::update_entity_translations(tx, CATEGORY, id, &request.translations, None)?;
            entities::entity_translations(tx, CATEGORY, id)
        })
    }
}
