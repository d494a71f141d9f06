//! Tab-delimited bulk-edit codec.
//!
//! One row per line in hierarchical order, columns fixed as
//! `uuid, code, chapter_id, article_id, sub_article_id, section_id,
//! clause_id, item_id, sub_item_id, content`. Numeric columns are empty when
//! the level does not apply. Content is the last column and the line is
//! split at most nine times, so tabs inside content survive a round trip.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::article::{compare_articles, parse_v4_uuid, Article, ArticleField};
use crate::error::{CoreError, Result};
use crate::locator::Locator;

const COLUMNS: usize = 10;

/// Render articles as a flat text block, pre-sorted hierarchically.
pub fn serialize(articles: &[Article]) -> String {
    let mut rows: Vec<&Article> = articles.iter().collect();
    rows.sort_by(|a, b| compare_articles(a, b));

    let mut out = String::new();
    for article in rows {
        let _ = write!(out, "{}", article.uuid);
        for level in article.locator.levels() {
            out.push('\t');
            if let Some(value) = level {
                let _ = write!(out, "{value}");
            }
        }
        out.push('\t');
        out.push_str(&article.content);
        out.push('\n');
    }
    out
}

/// Parse a flat text block back into articles of the given regulation.
///
/// Blank lines are skipped. A uuid column that fails v4 validation is
/// replaced with a freshly minted identity; downstream reconciliation will
/// then treat the row as newly inserted.
pub fn parse(text: &str, law_number: u32) -> Result<Vec<Article>> {
    parse_with(text, law_number, true)
}

/// Fail-closed variant of [`parse`]: a malformed uuid is an error instead of
/// a minted identity, so a row meant to update an existing article can never
/// be silently turned into an insert.
pub fn parse_strict(text: &str, law_number: u32) -> Result<Vec<Article>> {
    parse_with(text, law_number, false)
}

fn parse_with(text: &str, law_number: u32, mint_invalid: bool) -> Result<Vec<Article>> {
    let mut articles = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.splitn(COLUMNS, '\t').collect();
        if parts.len() < COLUMNS {
            return Err(CoreError::MalformedRow {
                line: line_no,
                reason: format!(
                    "expected {COLUMNS} tab-separated columns, found {}",
                    parts.len()
                ),
            });
        }

        let uuid = match parse_v4_uuid(parts[0].trim()) {
            Some(uuid) => uuid,
            None if mint_invalid => Uuid::new_v4(),
            None => {
                return Err(CoreError::MalformedUuid {
                    line: line_no,
                    value: parts[0].trim().to_string(),
                });
            }
        };

        let locator = Locator {
            code: parse_level(parts[1], ArticleField::Code, line_no)?,
            chapter_id: parse_level(parts[2], ArticleField::ChapterId, line_no)?,
            article_id: parse_level(parts[3], ArticleField::ArticleId, line_no)?,
            sub_article_id: parse_level(parts[4], ArticleField::SubArticleId, line_no)?,
            section_id: parse_level(parts[5], ArticleField::SectionId, line_no)?,
            clause_id: parse_level(parts[6], ArticleField::ClauseId, line_no)?,
            item_id: parse_level(parts[7], ArticleField::ItemId, line_no)?,
            sub_item_id: parse_level(parts[8], ArticleField::SubItemId, line_no)?,
        };

        articles.push(Article::with_uuid(uuid, law_number, locator, parts[9])?);
    }
    Ok(articles)
}

fn parse_level(raw: &str, field: ArticleField, line: usize) -> Result<Option<u32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>().map(Some).map_err(|_| CoreError::MalformedRow {
        line,
        reason: format!("{field} is not a non-negative integer: {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

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

    #[test]
    fn serialize_sorts_and_uses_fixed_columns() {
        let second = article(2, 1, "second");
        let first = article(1, 9, "first");
        let text = serialize(&[second.clone(), first.clone()]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!("{}\t\t1\t9\t\t\t\t\t\tfirst", first.uuid)
        );
        assert_eq!(
            lines[1],
            format!("{}\t\t2\t1\t\t\t\t\t\tsecond", second.uuid)
        );
    }

    #[test]
    fn round_trip_preserves_comparable_fields() {
        let rows = vec![
            article(1, 1, "alpha"),
            article(1, 2, "beta"),
            Article::new(
                1,
                Locator {
                    chapter_id: Some(1),
                    article_id: Some(2),
                    section_id: Some(3),
                    clause_id: Some(1),
                    ..Locator::default()
                },
                "gamma",
            )
            .unwrap(),
        ];

        let parsed = parse(&serialize(&rows), 1).unwrap();
        assert_eq!(parsed.len(), rows.len());
        for (parsed_row, original) in parsed.iter().zip(&rows) {
            assert_eq!(parsed_row.uuid, original.uuid);
            assert!(parsed_row.comparable_eq(original));
            assert_eq!(parsed_row.id, original.id);
        }
    }

    #[test]
    fn tabs_inside_content_survive() {
        let row = article(1, 1, "left\tright");
        let parsed = parse(&serialize(&[row.clone()]), 1).unwrap();
        assert_eq!(parsed[0].content, "left\tright");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let row = article(1, 1, "body");
        let text = format!("\n{}\n   \n", serialize(&[row]));
        let parsed = parse(&text, 1).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn empty_numeric_columns_stay_absent() {
        let uuid = Uuid::new_v4();
        let line = format!("{uuid}\t\t1\t2\t\t\t\t\t\tbody\n");
        let parsed = parse(&line, 1).unwrap();
        assert_eq!(parsed[0].locator.code, None);
        assert_eq!(parsed[0].locator.chapter_id, Some(1));
        assert_eq!(parsed[0].locator.sub_item_id, None);
    }

    #[test]
    fn invalid_uuid_gets_a_fresh_identity() {
        let line = "not-a-uuid\t\t1\t1\t\t\t\t\t\tbody\n";
        let parsed = parse(line, 1).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parse_v4_uuid(&parsed[0].uuid.to_string()).is_some());
    }

    #[test]
    fn strict_parse_fails_closed_on_invalid_uuid() {
        let line = "not-a-uuid\t\t1\t1\t\t\t\t\t\tbody\n";
        let err = parse_strict(line, 1).unwrap_err();
        match err {
            CoreError::MalformedUuid { line, value } => {
                assert_eq!(line, 1);
                assert_eq!(value, "not-a-uuid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_rows_are_rejected_with_the_line_number() {
        let uuid = Uuid::new_v4();
        let text = format!("{uuid}\t\t1\t1\t\t\t\t\t\tok\n{uuid}\t1\t2\n");
        let err = parse(&text, 1).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn non_numeric_levels_are_rejected() {
        let uuid = Uuid::new_v4();
        let line = format!("{uuid}\t\tone\t1\t\t\t\t\t\tbody\n");
        let err = parse(&line, 1).unwrap_err();
        match err {
            CoreError::MalformedRow { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("chapter_id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parsed_overflow_is_rejected() {
        let uuid = Uuid::new_v4();
        let line = format!("{uuid}\t\t100\t1\t\t\t\t\t\tbody\n");
        assert!(matches!(
            parse(&line, 1),
            Err(CoreError::FieldOverflow { .. })
        ));
    }
}
