//! Duplicate locator detection.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::article::Article;

/// Flag every article whose locator path exactly matches another article's
/// within the same regulation. Absent levels count as 0; content plays no
/// part. One grouping pass, so the cost stays linear in the working set.
///
/// Detection only: flagged rows surface a warning to the operator and block
/// nothing.
pub fn detect_duplicates(articles: &[Article]) -> HashSet<Uuid> {
    let mut by_path: HashMap<(u32, [u32; 8]), Vec<Uuid>> = HashMap::new();
    for article in articles {
        by_path
            .entry((article.law_number, article.locator.normalized()))
            .or_default()
            .push(article.uuid);
    }

    by_path
        .into_values()
        .filter(|group| group.len() > 1)
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::locator::Locator;

    fn article(law_number: u32, chapter: u32, article_no: u32, content: &str) -> Article {
        Article::new(
            law_number,
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
    fn flags_both_rows_of_a_shared_path() {
        let a = article(1, 2, 3, "first wording");
        let b = article(1, 2, 3, "second wording");
        let c = article(1, 2, 4, "unrelated");

        let flagged = detect_duplicates(&[a.clone(), c.clone(), b.clone()]);
        assert_eq!(flagged.len(), 2);
        assert!(flagged.contains(&a.uuid));
        assert!(flagged.contains(&b.uuid));
        assert!(!flagged.contains(&c.uuid));
    }

    #[test]
    fn distinct_paths_are_clean() {
        let rows = vec![article(1, 1, 1, "a"), article(1, 1, 2, "a"), article(1, 2, 1, "a")];
        assert!(detect_duplicates(&rows).is_empty());
    }

    #[test]
    fn different_regulations_do_not_collide() {
        let a = article(1, 2, 3, "x");
        let b = article(2, 2, 3, "x");
        assert!(detect_duplicates(&[a, b]).is_empty());
    }

    #[test]
    fn absent_and_zero_levels_share_a_path() {
        let mut a = article(1, 2, 3, "x");
        a.locator.section_id = None;
        let mut b = article(1, 2, 3, "y");
        b.locator.section_id = Some(0);

        let flagged = detect_duplicates(&[a.clone(), b.clone()]);
        assert_eq!(flagged.len(), 2);
    }

    #[test]
    fn three_way_groups_flag_everyone() {
        let rows = vec![
            article(1, 1, 1, "a"),
            article(1, 1, 1, "b"),
            article(1, 1, 1, "c"),
        ];
        let flagged = detect_duplicates(&rows);
        assert_eq!(flagged.len(), 3);
    }
}
