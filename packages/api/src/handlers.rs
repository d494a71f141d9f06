//! HTTP surface for the regulation editor frontend.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use statutebook_core::{
    apply_plan, detect_duplicates, flat_text, parse_v4_uuid, reconcile, Article, ChangeSet,
    Locator,
};

use crate::articles::{self, PgStore};
use crate::error::{ApiError, Result};
use crate::models::{Regulation, RegulationInput};
use crate::regulations;

/// One article row as submitted by the editor. A missing or invalid uuid
/// gets a freshly minted identity, which downstream reconciliation treats
/// as a new row.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlePayload {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub law_number: Option<u32>,
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub chapter_id: Option<u32>,
    #[serde(default)]
    pub article_id: Option<u32>,
    #[serde(default)]
    pub sub_article_id: Option<u32>,
    #[serde(default)]
    pub section_id: Option<u32>,
    #[serde(default)]
    pub clause_id: Option<u32>,
    #[serde(default)]
    pub item_id: Option<u32>,
    #[serde(default)]
    pub sub_item_id: Option<u32>,
    #[serde(default)]
    pub content: String,
}

impl ArticlePayload {
    /// Resolve into a core article under the regulation being edited. A row
    /// that names a different regulation is rejected, never reassigned.
    fn into_article(self, law_number: u32) -> Result<Article> {
        let uuid = self
            .uuid
            .as_deref()
            .and_then(parse_v4_uuid)
            .unwrap_or_else(Uuid::new_v4);

        if let Some(row_law) = self.law_number {
            if row_law != law_number {
                return Err(statutebook_core::CoreError::LawNumberMismatch {
                    uuid,
                    expected: law_number,
                    found: row_law,
                }
                .into());
            }
        }

        let locator = Locator {
            code: self.code,
            chapter_id: self.chapter_id,
            article_id: self.article_id,
            sub_article_id: self.sub_article_id,
            section_id: self.section_id,
            clause_id: self.clause_id,
            item_id: self.item_id,
            sub_item_id: self.sub_item_id,
        };

        Ok(Article::with_uuid(uuid, law_number, locator, self.content)?)
    }
}

#[derive(Debug, Serialize)]
pub struct RegulationWithArticles {
    #[serde(flatten)]
    pub regulation: Regulation,
    pub articles: Vec<Article>,
}

/// Outcome of a bulk mutation. `duplicates` lists rows sharing a locator
/// path with another row. A warning for the operator, never a failure.
#[derive(Debug, Serialize)]
pub struct SaveReport {
    pub unchanged: usize,
    pub updated: usize,
    pub added: usize,
    pub removed: usize,
    pub duplicates: Vec<Uuid>,
}

/// Dry-run classification of a submitted working set.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    #[serde(flatten)]
    pub change_set: ChangeSet,
    pub duplicates: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub removed: u64,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub uuids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub strict: bool,
}

pub fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/regulations",
            get(list_regulations).post(create_regulation),
        )
        .route(
            "/api/regulations/{law_number}",
            get(get_regulation)
                .put(update_regulation)
                .delete(delete_regulation),
        )
        .route(
            "/api/regulations/{law_number}/articles",
            post(bulk_add_articles).put(bulk_save_articles),
        )
        .route(
            "/api/regulations/{law_number}/articles/diff",
            post(diff_articles),
        )
        .route(
            "/api/regulations/{law_number}/articles/flat",
            get(export_flat_text).put(import_flat_text),
        )
        .route("/api/articles/{uuid}", delete(delete_article))
        .route("/api/articles/bulk-delete", post(bulk_delete_articles))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

async fn health(State(pool): State<PgPool>) -> Result<&'static str> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await?;
    Ok("OK")
}

async fn list_regulations(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<RegulationWithArticles>>> {
    let regs = regulations::list_regulations(&pool).await?;
    let mut out = Vec::with_capacity(regs.len());
    for regulation in regs {
        let articles =
            articles::query_articles(&pool, crate::models::from_db_int(regulation.regulation_number))
                .await?;
        out.push(RegulationWithArticles {
            regulation,
            articles,
        });
    }
    Ok(Json(out))
}

async fn get_regulation(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
) -> Result<Json<RegulationWithArticles>> {
    let regulation = regulations::get_regulation(&pool, law_number)
        .await?
        .ok_or(ApiError::RegulationNotFound(law_number))?;
    let articles = articles::query_articles(&pool, law_number).await?;
    Ok(Json(RegulationWithArticles {
        regulation,
        articles,
    }))
}

async fn create_regulation(
    State(pool): State<PgPool>,
    Json(input): Json<RegulationInput>,
) -> Result<Json<Regulation>> {
    let regulation = regulations::create_regulation(&pool, &input).await?;
    Ok(Json(regulation))
}

async fn update_regulation(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
    Json(input): Json<RegulationInput>,
) -> Result<Json<Regulation>> {
    let regulation = regulations::update_regulation(&pool, law_number, &input).await?;
    Ok(Json(regulation))
}

async fn delete_regulation(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
) -> Result<Json<DeleteReport>> {
    let removed = regulations::delete_regulation(&pool, law_number).await?;
    Ok(Json(DeleteReport {
        removed: u64::from(removed),
    }))
}

async fn bulk_add_articles(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
    Json(payload): Json<Vec<ArticlePayload>>,
) -> Result<Json<SaveReport>> {
    if payload.is_empty() {
        return Err(ApiError::EmptyPayload);
    }
    require_regulation(&pool, law_number).await?;

    let rows: Vec<Article> = payload
        .into_iter()
        .map(|p| p.into_article(law_number))
        .collect::<Result<_>>()?;

    let mut tx = pool.begin().await?;
    for row in &rows {
        articles::upsert_article(&mut *tx, row).await?;
    }
    tx.commit().await?;

    let working = articles::query_articles(&pool, law_number).await?;
    let duplicates = sorted_uuids(detect_duplicates(&working));
    warn_on_duplicates(law_number, &duplicates);

    Ok(Json(SaveReport {
        unchanged: 0,
        updated: 0,
        added: rows.len(),
        removed: 0,
        duplicates,
    }))
}

async fn bulk_save_articles(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
    Json(payload): Json<Vec<ArticlePayload>>,
) -> Result<Json<SaveReport>> {
    if payload.is_empty() {
        return Err(ApiError::EmptyPayload);
    }
    require_regulation(&pool, law_number).await?;

    let current: Vec<Article> = payload
        .into_iter()
        .map(|p| p.into_article(law_number))
        .collect::<Result<_>>()?;

    save_working_set(&pool, law_number, current).await.map(Json)
}

async fn diff_articles(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
    Json(payload): Json<Vec<ArticlePayload>>,
) -> Result<Json<DiffReport>> {
    require_regulation(&pool, law_number).await?;

    let current: Vec<Article> = payload
        .into_iter()
        .map(|p| p.into_article(law_number))
        .collect::<Result<_>>()?;

    let original = articles::query_articles(&pool, law_number).await?;
    let change_set = reconcile(&original, &current);
    let duplicates = sorted_uuids(detect_duplicates(&current));

    Ok(Json(DiffReport {
        change_set,
        duplicates,
    }))
}

async fn delete_article(
    State(pool): State<PgPool>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<DeleteReport>> {
    let mut tx = pool.begin().await?;
    let existed = articles::delete_article(&mut *tx, uuid).await?;
    tx.commit().await?;

    Ok(Json(DeleteReport {
        removed: u64::from(existed),
    }))
}

async fn bulk_delete_articles(
    State(pool): State<PgPool>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<DeleteReport>> {
    if request.uuids.is_empty() {
        return Err(ApiError::EmptyPayload);
    }

    let mut tx = pool.begin().await?;
    let removed = articles::delete_articles(&mut *tx, &request.uuids).await?;
    tx.commit().await?;

    Ok(Json(DeleteReport { removed }))
}

async fn export_flat_text(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
) -> Result<String> {
    require_regulation(&pool, law_number).await?;
    let articles = articles::query_articles(&pool, law_number).await?;
    Ok(flat_text::serialize(&articles))
}

async fn import_flat_text(
    State(pool): State<PgPool>,
    Path(law_number): Path<u32>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<Json<SaveReport>> {
    require_regulation(&pool, law_number).await?;

    let current = if params.strict {
        flat_text::parse_strict(&body, law_number)?
    } else {
        flat_text::parse(&body, law_number)?
    };
    if current.is_empty() {
        return Err(ApiError::EmptyPayload);
    }

    save_working_set(&pool, law_number, current).await.map(Json)
}

/// Load the stored snapshot, classify the submitted working set against it
/// and apply the resulting plan inside a single transaction.
async fn save_working_set(
    pool: &PgPool,
    law_number: u32,
    current: Vec<Article>,
) -> Result<SaveReport> {
    let mut tx = pool.begin().await?;
    let original = articles::query_articles(&mut *tx, law_number).await?;

    let change_set = reconcile(&original, &current);
    let plan = change_set.save_plan(law_number)?;

    let outcome = {
        let mut store = PgStore::new(&mut tx);
        apply_plan(&mut store, &plan).await?
    };
    tx.commit().await?;

    let duplicates = sorted_uuids(detect_duplicates(&current));
    warn_on_duplicates(law_number, &duplicates);

    Ok(SaveReport {
        unchanged: change_set.unchanged.len(),
        updated: outcome.updated,
        added: outcome.added,
        removed: outcome.removed,
        duplicates,
    })
}

async fn require_regulation(pool: &PgPool, law_number: u32) -> Result<()> {
    regulations::get_regulation(pool, law_number)
        .await?
        .ok_or(ApiError::RegulationNotFound(law_number))?;
    Ok(())
}

fn sorted_uuids(set: HashSet<Uuid>) -> Vec<Uuid> {
    let mut uuids: Vec<Uuid> = set.into_iter().collect();
    uuids.sort();
    uuids
}

fn warn_on_duplicates(law_number: u32, duplicates: &[Uuid]) {
    if !duplicates.is_empty() {
        tracing::warn!(
            law_number,
            count = duplicates.len(),
            "duplicate locator paths in working set"
        );
    }
}
