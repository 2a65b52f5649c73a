//! Three-level hierarchy traversal: composers, works per composer, score
//! candidates per work.

use std::collections::HashMap;

use exn::{OptionExt, ResultExt};
use imslip_extract::error::ErrorKind as ExtractErrorKind;
use imslip_extract::{RelationKind, composer_names, score_entries, works_by_relation};
use imslip_fetch::{FetchOptions, Fetcher};
use scraper::Html;
use tracing::{instrument, warn};
use url::Url;

use crate::error::{ErrorKind, Result};
use crate::models::{Composer, LeafEntry, Work};

/// The fixed catalog root: the people-with-recordings index.
pub const CATALOG_ROOT: &str =
    "https://imslp.org/index.php?title=Category:People_with_recordings&memberitst=Recordings";

const SITE: &str = "https://imslp.org";

/// The catalog as seen through a [`Fetcher`]. Holds no traversal state; each
/// listing call re-fetches (through the fetcher's cache) and re-parses, which
/// is what makes the walk restartable.
pub struct Catalog<F> {
    fetcher: F,
}

impl<F: Fetcher> Catalog<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn fetch_document(&self, url: &Url, options: &FetchOptions) -> Result<Html> {
        let response = self.fetcher.fetch(url, options).or_raise(|| ErrorKind::Fetch)?;
        Ok(Html::parse_document(&response.text()))
    }

    /// Enumerates every composer on the catalog root, in index order.
    ///
    /// The category URL is a deterministic function of the name (spaces to
    /// underscores). Duplicate names across letter buckets overwrite the
    /// earlier URL but keep the first-seen position, so resumption offsets
    /// stay aligned with catalog order.
    #[instrument(skip(self))]
    pub fn list_composers(&self) -> Result<Vec<Composer>> {
        let root = Url::parse(CATALOG_ROOT).or_raise(|| ErrorKind::InvalidUrl(CATALOG_ROOT.to_string()))?;
        let document = self.fetch_document(&root, &FetchOptions::cached())?;
        let names = composer_names(&document).or_raise(|| ErrorKind::Extract)?;
        let mut composers: Vec<Composer> = Vec::with_capacity(names.len());
        // First-seen position per name; the real index runs to tens of
        // thousands of entries, so no linear rescans.
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(names.len());
        for name in names {
            let url = category_url(&name)?;
            match positions.get(&name) {
                Some(&index) => composers[index].url = url,
                None => {
                    positions.insert(name.clone(), composers.len());
                    composers.push(Composer { name, url });
                },
            }
        }
        Ok(composers)
    }

    /// Enumerates a composer's works, grouped by relation kind in tab order.
    ///
    /// The category page redirects and carries volatile query parameters, so
    /// it is cached under a stable per-composer key instead of its URL.
    #[instrument(skip(self, composer), fields(composer = %composer.name))]
    pub fn list_works(&self, composer: &Composer) -> Result<Vec<(RelationKind, Vec<Work>)>> {
        let options = match composer_cache_key(&composer.url) {
            Some(key) => FetchOptions::cached_as(key),
            None => FetchOptions::cached(),
        };
        let document = self.fetch_document(&composer.url, &options)?;
        let groups = works_by_relation(&document).map_err(|e| {
            if let ExtractErrorKind::UnknownRelationKind(code) = &*e {
                let code = code.clone();
                e.raise(ErrorKind::UnknownRelation(code))
            } else {
                e.raise(ErrorKind::Extract)
            }
        })?;
        let mut works = Vec::with_capacity(groups.len());
        for (kind, titles) in groups {
            let mut group = Vec::with_capacity(titles.len());
            for title in titles {
                let url = wiki_url(&title)?;
                group.push(Work { title, url });
            }
            works.push((kind, group));
        }
        Ok(works)
    }

    /// Enumerates a work's download candidates in document order.
    ///
    /// Candidates with unparseable link targets are logged and skipped; a
    /// page with no candidates is an empty listing, not an error.
    #[instrument(skip(self, work), fields(work = %work.title))]
    pub fn list_scores(&self, work: &Work) -> Result<Vec<LeafEntry>> {
        let options = match work_cache_key(&work.url) {
            Some(key) => FetchOptions::cached_as(key),
            None => FetchOptions::cached(),
        };
        let document = self.fetch_document(&work.url, &options)?;
        let mut entries = Vec::new();
        for entry in score_entries(&document) {
            let candidate_url = match work.url.join(&entry.href) {
                Ok(url) => url,
                Err(e) => {
                    warn!(href = %entry.href, id = entry.numeric_id, error = %e, "skipping unparseable candidate link");
                    continue;
                },
            };
            entries.push(LeafEntry {
                title: entry.title,
                numeric_id: entry.numeric_id,
                candidate_url,
            });
        }
        Ok(entries)
    }
}

/// `Name Like This` -> `https://imslp.org/index.php?title=Category:Name_Like_This&intersect=Recordings`
fn category_url(name: &str) -> Result<Url> {
    let title = name.replace(' ', "_");
    Url::parse(&format!("{SITE}/index.php?title=Category:{title}&intersect=Recordings"))
        .ok()
        .ok_or_raise(|| ErrorKind::InvalidUrl(name.to_string()))
}

/// `Title Like This` -> `https://imslp.org/wiki/Title_Like_This`
fn wiki_url(title: &str) -> Result<Url> {
    Url::parse(&format!("{SITE}/wiki/{}", title.replace(' ', "_")))
        .ok()
        .ok_or_raise(|| ErrorKind::InvalidUrl(title.to_string()))
}

/// Stable cache key for a composer category page, derived from its `title`
/// query parameter.
fn composer_cache_key(url: &Url) -> Option<Url> {
    let title = url.query_pairs().find(|(name, _)| name == "title").map(|(_, value)| value.into_owned())?;
    Url::parse(&format!("{SITE}/composer/{title}")).ok()
}

/// Stable cache key for a work page: its URL with an `.html` suffix, so the
/// cached document never collides with a same-named directory entry.
fn work_cache_key(url: &Url) -> Option<Url> {
    Url::parse(&format!("{url}.html")).ok()
}

#[cfg(test)]
mod tests {
    use imslip_fetch::mock::MockFetcher;

    use super::*;

    const ROOT_PAGE: &str = r#"<div class="mw-content-ltr"><div></div><div><script>
        catpagejs({"s1":{"B":["Bach, Johann Sebastian"],"S":["Saint-Saëns, Camille"]}})
    </script></div></div>"#;

    #[test]
    fn test_list_composers_builds_deterministic_urls() {
        let catalog = Catalog::new(MockFetcher::new().page(CATALOG_ROOT, ROOT_PAGE));
        let composers = catalog.list_composers().unwrap();
        assert_eq!(composers.len(), 2);
        assert_eq!(composers[0].name, "Bach, Johann Sebastian");
        assert_eq!(
            composers[0].url.as_str(),
            "https://imslp.org/index.php?title=Category:Bach,_Johann_Sebastian&intersect=Recordings"
        );
        assert_eq!(composers[1].name, "Saint-Saëns, Camille");
        // Distinct names always map to distinct URLs.
        assert_ne!(composers[0].url, composers[1].url);
    }

    #[test]
    fn test_list_composers_duplicate_name_last_write_wins() {
        let page = r#"<div class="mw-content-ltr"><div><script>
            catpagejs({"s1":{"A":["Same, Name","Other, One"],"B":["Same, Name"]}})
        </script></div></div>"#;
        let catalog = Catalog::new(MockFetcher::new().page(CATALOG_ROOT, page));
        let composers = catalog.list_composers().unwrap();
        // One entry, first-seen position.
        assert_eq!(composers.len(), 2);
        assert_eq!(composers[0].name, "Same, Name");
    }

    #[test]
    fn test_list_works_wraps_unknown_relation() {
        let url = "https://imslp.org/index.php?title=Category:Bach,_Johann_Sebastian&intersect=Recordings";
        let page = r#"<div class="jq-ui-tabs"><div><script>catpagejs({"p99":["X"]})</script></div></div>"#;
        let catalog = Catalog::new(MockFetcher::new().page(url, page));
        let composer = Composer {
            name: "Bach, Johann Sebastian".to_string(),
            url: Url::parse(url).unwrap(),
        };
        let err = catalog.list_works(&composer).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownRelation(code) if code == "p99"));
    }

    #[test]
    fn test_list_works_maps_titles_to_wiki_urls() {
        let url = "https://imslp.org/index.php?title=Category:Bach,_Johann_Sebastian&intersect=Recordings";
        let page = r#"<div class="jq-ui-tabs"><div><script>
            catpagejs({"p1":{"M":["Mass in B minor, BWV 232 (Bach, Johann Sebastian)|1"]}})
        </script></div></div>"#;
        let catalog = Catalog::new(MockFetcher::new().page(url, page));
        let composer = Composer {
            name: "Bach, Johann Sebastian".to_string(),
            url: Url::parse(url).unwrap(),
        };
        let works = catalog.list_works(&composer).unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].0, RelationKind::Compositions);
        assert_eq!(
            works[0].1[0].url.as_str(),
            "https://imslp.org/wiki/Mass_in_B_minor,_BWV_232_(Bach,_Johann_Sebastian)"
        );
    }

    #[test]
    fn test_list_scores_joins_relative_links() {
        let url = "https://imslp.org/wiki/Some_Work";
        let page = r#"<div id="wpscore_tabs"><div class="jq-ui-tabs"><div class="we">
            <div id="IMSLP42">
                <a href="/wiki/Special:ImagefromIndex/42/abcd"></a>
                <span class="mh555"><a title="PDF">PDF</a></span>
                <span title="Full Score">Full Score</span>
            </div>
        </div></div></div>"#;
        let catalog = Catalog::new(MockFetcher::new().page(url, page));
        let work = Work { title: "Some Work".to_string(), url: Url::parse(url).unwrap() };
        let entries = catalog.list_scores(&work).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].numeric_id, 42);
        assert_eq!(
            entries[0].candidate_url.as_str(),
            "https://imslp.org/wiki/Special:ImagefromIndex/42/abcd"
        );
    }

    #[test]
    fn test_composer_cache_key_from_title_param() {
        let url = Url::parse(
            "https://imslp.org/index.php?title=Category:Bach,_Johann_Sebastian&intersect=Recordings",
        )
        .unwrap();
        let key = composer_cache_key(&url).unwrap();
        assert_eq!(key.as_str(), "https://imslp.org/composer/Category:Bach,_Johann_Sebastian");
    }
}
