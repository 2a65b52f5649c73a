//! Works-by-relation parsing (composer category pages).

use exn::OptionExt;
use scraper::Html;
use serde_json::Value;
use tracing::instrument;

use crate::blob;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::RelationKind;

/// Extracts every work title from a composer category page, grouped by
/// relation kind, in tab order.
///
/// Each category tab embeds one payload keyed `p<N>`; `N` is looked up in the
/// fixed [`RelationKind`] table and an unrecognized code aborts the whole
/// parse. A payload value is either a letter-keyed mapping of entry lists or
/// a flat entry list; both shapes yield identical output. Raw entries carry
/// trailing `|`-delimited fields which are discarded.
#[instrument(skip(document))]
pub fn works_by_relation(document: &Html) -> Result<Vec<(RelationKind, Vec<String>)>> {
    let payloads = blob::script_payloads(document, &consts::WORKS_SCRIPT_SELECTOR)?;
    let mut groups = Vec::with_capacity(payloads.len());
    for (key, value) in payloads {
        let kind = RelationKind::from_code(&key)?;
        groups.push((kind, entry_titles(&value)?));
    }
    Ok(groups)
}

/// Flattens a payload value into decoded work titles, shape-invariantly.
fn entry_titles(value: &Value) -> Result<Vec<String>> {
    let mut titles = Vec::new();
    match value {
        Value::Object(buckets) => {
            for bucket in buckets.values() {
                let list = bucket.as_array().ok_or_raise(|| ErrorKind::UnexpectedShape("works bucket"))?;
                collect_titles(list, &mut titles)?;
            }
        },
        Value::Array(list) => collect_titles(list, &mut titles)?,
        _ => exn::bail!(ErrorKind::UnexpectedShape("works payload")),
    }
    Ok(titles)
}

fn collect_titles(list: &[Value], titles: &mut Vec<String>) -> Result<()> {
    for entry in list {
        match entry {
            Value::String(raw) => titles.push(title_of(raw)),
            // Some tabs nest one more list level; flatten it the same way.
            Value::Array(inner) => collect_titles(inner, titles)?,
            _ => exn::bail!(ErrorKind::UnexpectedShape("works entry")),
        }
    }
    Ok(())
}

/// The work title is the substring before the first `|` delimiter.
fn title_of(raw: &str) -> String {
    raw.split('|').next().unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn category_page(scripts: &[&str]) -> Html {
        let tabs = scripts
            .iter()
            .map(|s| format!("<div><script>{s}</script></div>"))
            .collect::<String>();
        Html::parse_document(&format!(r#"<div class="jq-ui-tabs">{tabs}</div>"#))
    }

    #[rstest]
    #[case::letter_keyed(r#"catpagejs({"p1":{"M":["Mass in B minor, BWV 232 (Bach, Johann Sebastian)|232"],"T":["Toccata and Fugue in D minor, BWV 565 (Bach, Johann Sebastian)"]}})"#)]
    #[case::flat_list(r#"catpagejs({"p1":["Mass in B minor, BWV 232 (Bach, Johann Sebastian)|232","Toccata and Fugue in D minor, BWV 565 (Bach, Johann Sebastian)"]})"#)]
    fn test_shape_invariance(#[case] script: &str) {
        // A flat list and the same data reshaped as a letter-keyed mapping
        // must yield identical output.
        let document = category_page(&[script]);
        let groups = works_by_relation(&document).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, RelationKind::Compositions);
        assert_eq!(
            groups[0].1,
            vec![
                "Mass in B minor, BWV 232 (Bach, Johann Sebastian)",
                "Toccata and Fugue in D minor, BWV 565 (Bach, Johann Sebastian)",
            ]
        );
    }

    #[test]
    fn test_multiple_relation_tabs_in_order() {
        let document = category_page(&[
            r#"catpagejs({"p1":["Work A|1"]})"#,
            "setupTabs();",
            r#"catpagejs({"p4":["Arrangement B|2"]})"#,
        ]);
        let groups = works_by_relation(&document).unwrap();
        assert_eq!(
            groups,
            vec![
                (RelationKind::Compositions, vec!["Work A".to_string()]),
                (RelationKind::AsArranger, vec!["Arrangement B".to_string()]),
            ]
        );
    }

    #[test]
    fn test_unknown_relation_code_halts() {
        let document = category_page(&[
            r#"catpagejs({"p1":["Work A"]})"#,
            r#"catpagejs({"p99":["Mystery"]})"#,
        ]);
        let err = works_by_relation(&document).unwrap_err();
        match &*err {
            ErrorKind::UnknownRelationKind(code) => assert_eq!(code, "p99"),
            other => panic!("expected UnknownRelationKind, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_fields_discarded() {
        let document = category_page(&[r#"catpagejs({"p2":["Title|123|extra|fields"]})"#]);
        let groups = works_by_relation(&document).unwrap();
        assert_eq!(groups[0].1, vec!["Title"]);
    }
}
