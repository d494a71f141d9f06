//! Article persistence: query functions over any Postgres executor, plus
//! the transaction-scoped store that save batches run against.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use statutebook_core::{self as core, Article, ArticleStore, CoreError};

use crate::error::Result;
use crate::models::{db_int, db_level, ArticleRow};

/// All articles of one regulation. `display_id` is fixed-width and
/// zero-padded, so ordering by it recovers hierarchical document order.
pub async fn query_articles<'e, E>(executor: E, law_number: u32) -> Result<Vec<Article>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ArticleRow>(
        r#"
        SELECT * FROM articles
        WHERE law_number = $1
        ORDER BY display_id
        "#,
    )
    .bind(db_int(law_number))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Article::from).collect())
}

/// Insert or update one article keyed by uuid.
pub async fn upsert_article<'e, E>(executor: E, article: &Article) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO articles (
            uuid, law_number, code, chapter_id, article_id, sub_article_id,
            section_id, clause_id, item_id, sub_item_id, content, display_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (uuid) DO UPDATE SET
            law_number = EXCLUDED.law_number,
            code = EXCLUDED.code,
            chapter_id = EXCLUDED.chapter_id,
            article_id = EXCLUDED.article_id,
            sub_article_id = EXCLUDED.sub_article_id,
            section_id = EXCLUDED.section_id,
            clause_id = EXCLUDED.clause_id,
            item_id = EXCLUDED.item_id,
            sub_item_id = EXCLUDED.sub_item_id,
            content = EXCLUDED.content,
            display_id = EXCLUDED.display_id,
            updated_at = now()
        "#,
    )
    .bind(article.uuid)
    .bind(db_int(article.law_number))
    .bind(db_level(article.locator.code))
    .bind(db_level(article.locator.chapter_id))
    .bind(db_level(article.locator.article_id))
    .bind(db_level(article.locator.sub_article_id))
    .bind(db_level(article.locator.section_id))
    .bind(db_level(article.locator.clause_id))
    .bind(db_level(article.locator.item_id))
    .bind(db_level(article.locator.sub_item_id))
    .bind(&article.content)
    .bind(&article.id)
    .execute(executor)
    .await?;

    Ok(())
}

/// Delete by uuid. Returns whether a row existed.
pub async fn delete_article<'e, E>(executor: E, uuid: Uuid) -> Result<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(r#"DELETE FROM articles WHERE uuid = $1"#)
        .bind(uuid)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a whole uuid set in one statement; returns the number of rows
/// that actually existed.
pub async fn delete_articles<'e, E>(executor: E, uuids: &[Uuid]) -> Result<u64>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(r#"DELETE FROM articles WHERE uuid = ANY($1)"#)
        .bind(uuids.to_vec())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Core store implementation scoped to one open connection, in practice a
/// transaction, so a whole save batch commits or rolls back together.
pub struct PgStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ArticleStore for PgStore<'_> {
    async fn query(&mut self, law_number: u32) -> core::Result<Vec<Article>> {
        query_articles(&mut *self.conn, law_number)
            .await
            .map_err(|e| CoreError::Persistence {
                affected: None,
                message: e.to_string(),
            })
    }

    async fn upsert(&mut self, article: &Article) -> core::Result<()> {
        upsert_article(&mut *self.conn, article)
            .await
            .map_err(|e| CoreError::Persistence {
                affected: Some(article.uuid),
                message: e.to_string(),
            })
    }

    async fn delete(&mut self, uuid: Uuid) -> core::Result<bool> {
        delete_article(&mut *self.conn, uuid)
            .await
            .map_err(|e| CoreError::Persistence {
                affected: Some(uuid),
                message: e.to_string(),
            })
    }
}
