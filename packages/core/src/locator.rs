//! Hierarchical locator paths and the derived display identifier.
//!
//! Legal text is addressed by a strictly ordered path of numbering levels,
//! most-significant first: code > chapter > article > sub-article > section >
//! clause > item > sub-item. A level that does not apply is absent, not zero;
//! absence is normalized to 0 only when comparing or rendering.
//!
//! The display identifier packs the owning regulation number and all eight
//! levels into a fixed-width string (`"A"` followed by nine zero-padded
//! fields, 21 characters in total) so that plain lexicographic order,
//! in memory or in an `ORDER BY`, recovers hierarchical document order.

use std::cmp::Ordering;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::article::ArticleField;
use crate::error::{CoreError, Result};

/// Total length of a display identifier: `'A'` plus nine padded fields
/// (3 digits for the regulation number and the article level, 2 for the
/// rest).
pub const DISPLAY_ID_LEN: usize = 21;

const LAW_NUMBER_WIDTH: u32 = 3;

/// Digit budget per numbering level, most-significant first.
const LEVELS: [(ArticleField, u32); 8] = [
    (ArticleField::Code, 2),
    (ArticleField::ChapterId, 2),
    (ArticleField::ArticleId, 3),
    (ArticleField::SubArticleId, 2),
    (ArticleField::SectionId, 2),
    (ArticleField::ClauseId, 2),
    (ArticleField::ItemId, 2),
    (ArticleField::SubItemId, 2),
];

/// An article's position in the numbering hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
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
}

impl Locator {
    /// The eight levels in order, as stored (absent levels stay absent).
    pub fn levels(&self) -> [Option<u32>; 8] {
        [
            self.code,
            self.chapter_id,
            self.article_id,
            self.sub_article_id,
            self.section_id,
            self.clause_id,
            self.item_id,
            self.sub_item_id,
        ]
    }

    /// The eight levels normalized for comparison: absent becomes 0.
    pub fn normalized(&self) -> [u32; 8] {
        self.levels().map(|level| level.unwrap_or(0))
    }

    /// Field-by-field hierarchical order; the first differing level wins.
    /// Locators with identical normalized paths compare equal.
    pub fn cmp_hierarchical(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }

    /// Levels whose normalized values differ from `other`, most-significant
    /// first.
    pub fn diff(&self, other: &Self) -> Vec<ArticleField> {
        let (a, b) = (self.normalized(), other.normalized());
        LEVELS
            .iter()
            .enumerate()
            .filter(|(i, _)| a[*i] != b[*i])
            .map(|(_, (field, _))| *field)
            .collect()
    }

    /// Check every level against its digit budget.
    pub fn validate(&self) -> Result<()> {
        for ((field, width), value) in LEVELS.iter().zip(self.normalized()) {
            check_width(*field, value, *width)?;
        }
        Ok(())
    }

    /// Render the display identifier for this locator under the given
    /// regulation number. Rejects any field that would not fit its width;
    /// truncation would let distinct paths collide.
    pub fn display_id(&self, law_number: u32) -> Result<String> {
        let mut id = String::with_capacity(DISPLAY_ID_LEN);
        id.push('A');
        push_field(&mut id, ArticleField::LawNumber, law_number, LAW_NUMBER_WIDTH)?;
        for ((field, width), value) in LEVELS.iter().zip(self.normalized()) {
            push_field(&mut id, *field, value, *width)?;
        }
        Ok(id)
    }
}

fn check_width(field: ArticleField, value: u32, width: u32) -> Result<()> {
    let max = 10u32.pow(width) - 1;
    if value > max {
        return Err(CoreError::FieldOverflow { field, value, max });
    }
    Ok(())
}

fn push_field(out: &mut String, field: ArticleField, value: u32, width: u32) -> Result<()> {
    check_width(field, value, width)?;
    let width = width as usize;
    let _ = write!(out, "{value:0width$}");
    Ok(())
}
