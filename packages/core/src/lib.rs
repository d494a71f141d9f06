//! Statutebook core: hierarchical article numbering and bulk-edit logic.
//!
//! Legal articles are addressed by a fixed hierarchy of numbering levels and
//! identified by a stable uuid plus a derived, lexicographically-sortable
//! display id. This crate owns the pieces with real invariants:
//!
//! - [`locator`]: locator paths, display-id generation, hierarchical order
//! - [`article`]: the article record and editable-field diffing
//! - [`duplicates`]: locator-collision detection within a regulation
//! - [`reconcile`]: classifying a submitted working set against a stored
//!   snapshot and planning the save batch
//! - [`flat_text`]: the tab-delimited bulk-edit codec
//! - [`store`]: the storage collaborator seam and its in-memory reference
//!
//! Persistence and HTTP live in the `statutebook-api` crate.

pub mod article;
pub mod duplicates;
pub mod error;
pub mod flat_text;
pub mod locator;
pub mod reconcile;
pub mod store;

pub use article::{compare_articles, parse_v4_uuid, Article, ArticleField};
pub use duplicates::detect_duplicates;
pub use error::{CoreError, Result};
pub use locator::{Locator, DISPLAY_ID_LEN};
pub use reconcile::{reconcile, ChangeSet, ModifiedArticle, SavePlan};
pub use store::{apply_plan, ArticleStore, MemoryStore, SaveOutcome};
