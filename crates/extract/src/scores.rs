//! Score listing parsing (work pages).

use scraper::Html;
use tracing::instrument;

use crate::consts;

/// One downloadable candidate scraped from a work page, before URL
/// resolution. The `href` is kept raw; the caller joins it against the page
/// URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub title: String,
    pub numeric_id: u64,
    pub href: String,
}

/// Scans all score tabs of a work page for download candidates, in document
/// order.
///
/// Candidate blocks are the tab children whose `id` attribute carries the
/// `IMSLP<N>` prefix. Blocks without a nested titled link are non-downloadable
/// entries (engraving notices, external links) and are skipped, not errors.
#[instrument(skip(document))]
pub fn score_entries(document: &Html) -> Vec<ScoreEntry> {
    let mut entries = Vec::new();
    for tab in document.select(&consts::SCORE_TABS_SELECTOR) {
        for block in tab.select(&consts::SCORE_BLOCK_SELECTOR) {
            let Some(id) = block.value().attr("id") else { continue };
            let Some(digits) = id.strip_prefix("IMSLP") else { continue };
            let Ok(numeric_id) = digits.parse::<u64>() else { continue };
            if block.select(&consts::TYPED_LINK_SELECTOR).next().is_none() {
                continue;
            }
            let Some(anchor) = block.select(&consts::ANCHOR_SELECTOR).next() else { continue };
            let Some(href) = anchor.value().attr("href") else { continue };
            let Some(title_span) = block.select(&consts::TITLE_SPAN_SELECTOR).next() else { continue };
            let title = title_span.text().collect::<String>().trim().to_string();
            entries.push(ScoreEntry { title, numeric_id, href: href.to_string() });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_page(blocks: &str) -> Html {
        Html::parse_document(&format!(
            r#"<div id="wpscore_tabs"><div class="jq-ui-tabs"><div class="we">{blocks}</div></div></div>"#
        ))
    }

    fn block(id: &str, href: &str, title: &str) -> String {
        format!(
            r#"<div id="{id}">
                <a href="{href}"></a>
                <span class="mh555"><a title="PDF">PDF</a></span>
                <span title="{title}"> {title} </span>
            </div>"#
        )
    }

    #[test]
    fn test_entries_in_document_order() {
        let document = work_page(&format!(
            "{}{}",
            block("IMSLP12345", "https://imslp.org/wiki/Special:ImagefromIndex/12345/xyz", "Full Score"),
            block("IMSLP678", "https://imslp.org/wiki/Special:ImagefromIndex/678/abc", "Parts"),
        ));
        let entries = score_entries(&document);
        assert_eq!(
            entries,
            vec![
                ScoreEntry {
                    title: "Full Score".to_string(),
                    numeric_id: 12345,
                    href: "https://imslp.org/wiki/Special:ImagefromIndex/12345/xyz".to_string(),
                },
                ScoreEntry {
                    title: "Parts".to_string(),
                    numeric_id: 678,
                    href: "https://imslp.org/wiki/Special:ImagefromIndex/678/abc".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_skips_blocks_without_titled_link() {
        // No nested span.mh555 > a[title] means the entry is not downloadable.
        let document = work_page(
            r#"<div id="IMSLP555"><a href="/x"></a><span title="Notice">Notice</span></div>"#,
        );
        assert!(score_entries(&document).is_empty());
    }

    #[test]
    fn test_skips_non_imslp_ids() {
        let document = work_page(&block("OTHER42", "/x", "Nope"));
        assert!(score_entries(&document).is_empty());
    }

    #[test]
    fn test_title_is_trimmed() {
        let document = work_page(&block("IMSLP1", "/x", "Full Score"));
        assert_eq!(score_entries(&document)[0].title, "Full Score");
    }
}
