//! Article records and editable-field diffing.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant, Version};

use crate::error::Result;
use crate::locator::Locator;

/// Named article fields, as surfaced to the editing UI when highlighting
/// which columns of a row changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleField {
    LawNumber,
    Code,
    ChapterId,
    ArticleId,
    SubArticleId,
    SectionId,
    ClauseId,
    ItemId,
    SubItemId,
    Content,
}

impl ArticleField {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleField::LawNumber => "law_number",
            ArticleField::Code => "code",
            ArticleField::ChapterId => "chapter_id",
            ArticleField::ArticleId => "article_id",
            ArticleField::SubArticleId => "sub_article_id",
            ArticleField::SectionId => "section_id",
            ArticleField::ClauseId => "clause_id",
            ArticleField::ItemId => "item_id",
            ArticleField::SubItemId => "sub_item_id",
            ArticleField::Content => "content",
        }
    }
}

impl fmt::Display for ArticleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One article of a regulation's legal text.
///
/// The `uuid` is the stable identity: assigned once at creation and kept
/// across renumbering and edits. The `id` is derived presentation/sort
/// state, regenerated from the locator and `law_number` on every mutation
/// and never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub uuid: Uuid,
    pub law_number: u32,
    #[serde(flatten)]
    pub locator: Locator,
    pub content: String,
    pub id: String,
}

impl Article {
    /// Create an article with a freshly minted identity.
    pub fn new(law_number: u32, locator: Locator, content: impl Into<String>) -> Result<Self> {
        Self::with_uuid(Uuid::new_v4(), law_number, locator, content)
    }

    /// Create an article under an existing identity.
    pub fn with_uuid(
        uuid: Uuid,
        law_number: u32,
        locator: Locator,
        content: impl Into<String>,
    ) -> Result<Self> {
        let id = locator.display_id(law_number)?;
        Ok(Self {
            uuid,
            law_number,
            locator,
            content: content.into(),
            id,
        })
    }

    /// Recompute the derived display identifier after a locator or
    /// `law_number` edit.
    pub fn refresh_display_id(&mut self) -> Result<()> {
        self.id = self.locator.display_id(self.law_number)?;
        Ok(())
    }

    /// Equality over the editable fields: locator levels (normalized, so an
    /// absent level equals an explicit 0) and content. Identity and the
    /// derived id are excluded.
    pub fn comparable_eq(&self, other: &Self) -> bool {
        self.locator.cmp_hierarchical(&other.locator) == Ordering::Equal
            && self.content == other.content
    }

    /// Which editable fields differ from `other`, in column order.
    pub fn changed_fields(&self, other: &Self) -> Vec<ArticleField> {
        let mut changed = self.locator.diff(&other.locator);
        if self.content != other.content {
            changed.push(ArticleField::Content);
        }
        changed
    }
}

/// Hierarchical order over articles: locator levels only, first difference
/// wins, identical paths compare equal.
pub fn compare_articles(a: &Article, b: &Article) -> Ordering {
    a.locator.cmp_hierarchical(&b.locator)
}

/// Validate the hyphenated UUID-v4 shape used for article identities:
/// version nibble 4, RFC 4122 variant, case-insensitive hex.
pub fn parse_v4_uuid(s: &str) -> Option<Uuid> {
    let bytes = s.as_bytes();
    if bytes.len() != 36
        || bytes[8] != b'-'
        || bytes[13] != b'-'
        || bytes[18] != b'-'
        || bytes[23] != b'-'
    {
        return None;
    }
    let parsed = Uuid::try_parse(s).ok()?;
    (parsed.get_version() == Some(Version::Random) && parsed.get_variant() == Variant::RFC4122)
        .then_some(parsed)
}
