//! Bulk-edit reconciliation against a stored snapshot.
//!
//! The editor submits its whole working set; `reconcile` classifies every
//! row against the authoritative snapshot by uuid, and `save_plan` turns the
//! classification into a validated persistence order a storage collaborator
//! can wrap in one transaction.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::article::{Article, ArticleField};
use crate::error::{CoreError, Result};

/// A row that differs from its stored counterpart. Carries the columns that
/// changed (drives the editor's highlighting) and the stored values so the
/// row can be restored without another round trip.
#[derive(Debug, Clone, Serialize)]
pub struct ModifiedArticle {
    pub article: Article,
    pub original: Article,
    pub changed_fields: Vec<ArticleField>,
}

/// Classification of one submitted working set against a stored snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    pub unchanged: Vec<Article>,
    pub modified: Vec<ModifiedArticle>,
    pub inserted: Vec<Article>,
    pub removed: Vec<Uuid>,
}

/// Persistence order for one save batch: uuid-keyed upserts (updates first,
/// then inserts) followed by deletes. The caller wraps the whole plan in a
/// single transaction.
#[derive(Debug, Clone, Default)]
pub struct SavePlan {
    pub updates: Vec<Article>,
    pub inserts: Vec<Article>,
    pub deletes: Vec<Uuid>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Classify `current` against `original`, matching rows by uuid.
///
/// Rows are processed strictly in submission order against a working copy of
/// the snapshot, so a uuid that appears twice in one payload has its second
/// occurrence compared against the first occurrence's value, exactly as if
/// the rows had been applied one at a time.
pub fn reconcile(original: &[Article], current: &[Article]) -> ChangeSet {
    let mut working: HashMap<Uuid, Article> =
        original.iter().map(|a| (a.uuid, a.clone())).collect();
    let mut seen: HashSet<Uuid> = HashSet::new();

    let mut change_set = ChangeSet::default();
    for row in current {
        seen.insert(row.uuid);
        match working.get(&row.uuid).cloned() {
            Some(prev) if prev.comparable_eq(row) => {
                change_set.unchanged.push(row.clone());
            }
            Some(prev) => {
                change_set.modified.push(ModifiedArticle {
                    changed_fields: prev.changed_fields(row),
                    original: prev,
                    article: row.clone(),
                });
                working.insert(row.uuid, row.clone());
            }
            None => {
                change_set.inserted.push(row.clone());
                working.insert(row.uuid, row.clone());
            }
        }
    }

    change_set.removed = original
        .iter()
        .filter(|a| !seen.contains(&a.uuid))
        .map(|a| a.uuid)
        .collect();

    tracing::debug!(
        unchanged = change_set.unchanged.len(),
        modified = change_set.modified.len(),
        inserted = change_set.inserted.len(),
        removed = change_set.removed.len(),
        "working set reconciled"
    );
    change_set
}

impl ChangeSet {
    /// Undo a pending modification: the entry reverts to its stored values
    /// and moves back to `unchanged`. The uuid is untouched.
    pub fn restore(&mut self, uuid: Uuid) -> Result<Article> {
        let idx = self
            .modified
            .iter()
            .position(|m| m.article.uuid == uuid)
            .ok_or(CoreError::NotFound(uuid))?;
        let entry = self.modified.remove(idx);
        self.unchanged.push(entry.original.clone());
        Ok(entry.original)
    }

    /// Validate the pending rows against the selected regulation and lay
    /// out the persistence order.
    ///
    /// Fails before anything touches storage: a row whose `law_number`
    /// disagrees with the regulation being edited is rejected rather than
    /// silently reassigned, and every locator level is checked against its
    /// digit budget while the display identifiers are recomputed.
    pub fn save_plan(&self, law_number: u32) -> Result<SavePlan> {
        let mut plan = SavePlan::default();
        for entry in &self.modified {
            plan.updates.push(prepare_row(&entry.article, law_number)?);
        }
        for row in &self.inserted {
            plan.inserts.push(prepare_row(row, law_number)?);
        }
        plan.deletes = self.removed.clone();
        Ok(plan)
    }
}

fn prepare_row(row: &Article, law_number: u32) -> Result<Article> {
    if row.law_number != law_number {
        return Err(CoreError::LawNumberMismatch {
            uuid: row.uuid,
            expected: law_number,
            found: row.law_number,
        });
    }
    let mut prepared = row.clone();
    prepared.refresh_display_id()?;
    Ok(prepared)
}
