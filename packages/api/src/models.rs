use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use statutebook_core::{Article, Locator};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Regulation {
    pub regulation_number: i32,
    pub regulation_name: String,
    pub authority: String,
    pub update_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a regulation. The update date
/// is a free-form display string, entered however the operator writes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RegulationInput {
    pub regulation_name: String,
    pub authority: String,
    #[serde(default)]
    pub update_date: String,
}

/// One `articles` row as stored. Converted to the core [`Article`] at the
/// query boundary; the stored `display_id` is trusted because every write
/// path recomputes it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub uuid: Uuid,
    pub law_number: i32,
    pub code: Option<i32>,
    pub chapter_id: Option<i32>,
    pub article_id: Option<i32>,
    pub sub_article_id: Option<i32>,
    pub section_id: Option<i32>,
    pub clause_id: Option<i32>,
    pub item_id: Option<i32>,
    pub sub_item_id: Option<i32>,
    pub content: String,
    pub display_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            uuid: row.uuid,
            law_number: from_db_int(row.law_number),
            locator: Locator {
                code: from_db_level(row.code),
                chapter_id: from_db_level(row.chapter_id),
                article_id: from_db_level(row.article_id),
                sub_article_id: from_db_level(row.sub_article_id),
                section_id: from_db_level(row.section_id),
                clause_id: from_db_level(row.clause_id),
                item_id: from_db_level(row.item_id),
                sub_item_id: from_db_level(row.sub_item_id),
            },
            content: row.content,
            id: row.display_id,
        }
    }
}

// The schema CHECK-constrains every numeric column to be non-negative, so
// these conversions only clamp rows that predate the constraint.
pub(crate) fn from_db_int(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

pub(crate) fn from_db_level(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

pub(crate) fn db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) fn db_level(value: Option<u32>) -> Option<i32> {
    value.map(db_int)
}
