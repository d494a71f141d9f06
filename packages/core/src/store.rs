//! Storage collaborator seam.
//!
//! The reconciler sequences operations; the implementor supplies the
//! transactional scope around a whole batch. [`apply_plan`] never issues a
//! partial commit of its own: the first failure aborts, and the caller's
//! transaction rolls everything back. Upserts are keyed by uuid, so
//! re-running the same plan after a lost response converges on the same
//! state.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::article::{compare_articles, Article};
use crate::error::Result;
use crate::reconcile::SavePlan;

/// Row-level operations the reconciler needs from a backing store.
#[async_trait]
pub trait ArticleStore {
    /// All articles of one regulation in hierarchical order.
    async fn query(&mut self, law_number: u32) -> Result<Vec<Article>>;

    /// Insert or update a row keyed by uuid.
    async fn upsert(&mut self, article: &Article) -> Result<()>;

    /// Delete by uuid. Returns whether a row existed; deleting an absent
    /// uuid is a tolerated no-op.
    async fn delete(&mut self, uuid: Uuid) -> Result<bool>;
}

/// Row counts reported back to the caller after a save batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub updated: usize,
    pub added: usize,
    pub removed: usize,
}

/// Run one save batch in plan order (updates, inserts, then deletes),
/// strictly one row at a time, so each statement observes the rows already
/// applied before it.
pub async fn apply_plan<S>(store: &mut S, plan: &SavePlan) -> Result<SaveOutcome>
where
    S: ArticleStore + Send,
{
    let mut outcome = SaveOutcome::default();
    for row in &plan.updates {
        store.upsert(row).await?;
        outcome.updated += 1;
    }
    for row in &plan.inserts {
        store.upsert(row).await?;
        outcome.added += 1;
    }
    for uuid in &plan.deletes {
        if store.delete(*uuid).await? {
            outcome.removed += 1;
        }
    }

    tracing::info!(
        updated = outcome.updated,
        added = outcome.added,
        removed = outcome.removed,
        "save batch applied"
    );
    Ok(outcome)
}

/// In-memory store: the reference implementation used by tests and small
/// tools.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: HashMap<Uuid, Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_articles<I>(articles: I) -> Self
    where
        I: IntoIterator<Item = Article>,
    {
        Self {
            rows: articles.into_iter().map(|a| (a.uuid, a)).collect(),
        }
    }

    pub fn get(&self, uuid: Uuid) -> Option<&Article> {
        self.rows.get(&uuid)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn query(&mut self, law_number: u32) -> Result<Vec<Article>> {
        let mut rows: Vec<Article> = self
            .rows
            .values()
            .filter(|a| a.law_number == law_number)
            .cloned()
            .collect();
        rows.sort_by(compare_articles);
        Ok(rows)
    }

    async fn upsert(&mut self, article: &Article) -> Result<()> {
        self.rows.insert(article.uuid, article.clone());
        Ok(())
    }

    async fn delete(&mut self, uuid: Uuid) -> Result<bool> {
        Ok(self.rows.remove(&uuid).is_some())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::locator::Locator;
    use crate::reconcile::reconcile;

    fn article(chapter: u32, article_no: u32, content: &str) -> Article {
        Article::new(
            1,
            Locator {
                chapter_id: Some(chapter),
                article_id: Some(article_no),
                ..Locator::default()
            },
            content,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn query_returns_one_regulation_sorted() {
        let mut store = MemoryStore::from_articles(vec![
            article(2, 1, "late"),
            article(1, 1, "early"),
            Article::new(
                9,
                Locator {
                    article_id: Some(1),
                    ..Locator::default()
                },
                "other regulation",
            )
            .unwrap(),
        ]);

        let rows = store.query(1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "early");
        assert_eq!(rows[1].content, "late");
    }

    #[tokio::test]
    async fn apply_plan_counts_each_kind() {
        let stored = vec![article(1, 1, "a"), article(1, 2, "b")];
        let mut store = MemoryStore::from_articles(stored.clone());

        let mut edited = stored[0].clone();
        edited.content = "a2".into();
        let fresh = article(1, 3, "c");
        // stored[1] is dropped from the working set.
        let current = vec![edited.clone(), fresh.clone()];

        let plan = reconcile(&stored, &current).save_plan(1).unwrap();
        let outcome = apply_plan(&mut store, &plan).await.unwrap();

        assert_eq!(
            outcome,
            SaveOutcome {
                updated: 1,
                added: 1,
                removed: 1,
            }
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(edited.uuid).unwrap().content, "a2");
        assert!(store.get(fresh.uuid).is_some());
        assert!(store.get(stored[1].uuid).is_none());
    }

    #[tokio::test]
    async fn reapplying_the_same_plan_is_idempotent() {
        let stored = vec![article(1, 1, "a")];
        let mut store = MemoryStore::from_articles(stored.clone());

        let mut edited = stored[0].clone();
        edited.content = "b".into();
        let plan = reconcile(&stored, &[edited.clone()]).save_plan(1).unwrap();

        apply_plan(&mut store, &plan).await.unwrap();
        let rows_after_first = store.query(1).await.unwrap();

        // Same payload delivered twice: the upserts converge, the delete
        // set stays empty, nothing duplicates.
        let outcome = apply_plan(&mut store, &plan).await.unwrap();
        assert_eq!(store.query(1).await.unwrap(), rows_after_first);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 0);
    }

    #[tokio::test]
    async fn deleting_missing_rows_reports_zero() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
    }
}
