//! The crawl loop: composers, their works, their score candidates, binary
//! downloads. One request at a time, top to bottom.

use std::mem;

use derive_more::Display;
use exn::ResultExt;
use imslip_catalog::error::ErrorKind as CatalogErrorKind;
use imslip_catalog::{Catalog, Score};
use imslip_config::Offsets;
use imslip_fetch::Fetcher;
use imslip_library::{Presence, ScoreStore};
use tracing::{error, info, instrument, warn};

use crate::error::{ErrorKind, Result};

/// Counter tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display("{downloaded} downloaded, {skipped} already present, {unavailable} unavailable, {failed} failed")]
pub struct Summary {
    pub downloaded: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub failed: usize,
}

/// Drives the full traversal against a catalog and a score store.
///
/// Failure routing is per level: a composer or work whose page cannot be
/// fetched is logged and skipped, the walk moves on. Extraction failures and
/// unknown relation codes mean the catalog schema drifted, which poisons
/// everything after the current position, so those abort the run. Ambiguous
/// local state aborts too: continuing would re-download or mis-skip.
pub struct Coordinator<F> {
    catalog: Catalog<F>,
    store: ScoreStore,
    offsets: Offsets,
}

impl<F: Fetcher> Coordinator<F> {
    pub fn new(catalog: Catalog<F>, store: ScoreStore, offsets: Offsets) -> Self {
        Self { catalog, store, offsets }
    }

    /// Runs the crawl to completion, or to the first fatal error.
    ///
    /// The work and score offsets apply only to the first composer and the
    /// first work respectively; every later sibling starts from zero. That is
    /// what makes `--composer-offset 12 --work-offset 3` resume exactly where
    /// an interrupted run stopped. An offset is spent on the first sibling
    /// reached even when that sibling's page fails: it pointed into that
    /// entry, so carrying it over would mis-skip the next one.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<Summary> {
        let mut summary = Summary::default();
        let composers = self.catalog.list_composers().or_raise(|| ErrorKind::Catalog)?;
        info!(total = composers.len(), skipping = self.offsets.composer, "catalog root listed");
        let mut work_offset = self.offsets.work;
        let mut score_offset = self.offsets.score;
        for composer in composers.iter().skip(self.offsets.composer) {
            // Both inner offsets point into this composer; consume them here
            // so a failure below cannot leak them into the next sibling.
            let skip_works = mem::take(&mut work_offset);
            let groups = match self.catalog.list_works(composer) {
                Ok(groups) => groups,
                Err(e) if matches!(&*e, CatalogErrorKind::Fetch) => {
                    warn!(composer = %composer.name, error = %e, "composer page failed, moving on");
                    summary.failed += 1;
                    score_offset = 0;
                    continue;
                },
                Err(e) => return Err(e.raise(ErrorKind::Catalog)),
            };
            let works: Vec<_> = groups.into_iter().flat_map(|(_, works)| works).collect();
            info!(composer = %composer.name, works = works.len(), "composer listed");
            for work in works.iter().skip(skip_works) {
                let skip_scores = mem::take(&mut score_offset);
                let entries = match self.catalog.list_scores(work) {
                    Ok(entries) => entries,
                    Err(e) if matches!(&*e, CatalogErrorKind::Fetch) => {
                        warn!(work = %work.title, error = %e, "work page failed, moving on");
                        summary.failed += 1;
                        continue;
                    },
                    Err(e) => return Err(e.raise(ErrorKind::Catalog)),
                };
                let dir = self.store.work_dir(&composer.name, &work.title);
                for entry in entries.iter().skip(skip_scores) {
                    match self.store.presence(&dir, entry.numeric_id).or_raise(|| ErrorKind::Storage)? {
                        Presence::Present(path) => {
                            info!(id = entry.numeric_id, path = %path.display(), "already present");
                            summary.skipped += 1;
                        },
                        Presence::Ambiguous(files) => {
                            error!(
                                id = entry.numeric_id,
                                files = ?files,
                                dir = %dir.display(),
                                "conflicting files for one score, clean up before rerunning"
                            );
                            exn::bail!(ErrorKind::AmbiguousState { id: entry.numeric_id, files });
                        },
                        Presence::Absent => match self.catalog.resolve_score(entry) {
                            Ok(Score::Artifact { filename, content }) => {
                                let path = self
                                    .store
                                    .write(&dir, &filename, &content)
                                    .or_raise(|| ErrorKind::Storage)?;
                                info!(id = entry.numeric_id, path = %path.display(), bytes = content.len(), "downloaded");
                                summary.downloaded += 1;
                            },
                            Ok(Score::Unavailable) => {
                                warn!(id = entry.numeric_id, title = %entry.title, "score unavailable");
                                summary.unavailable += 1;
                            },
                            Err(e) => {
                                warn!(id = entry.numeric_id, error = %e, "resolution failed, moving on");
                                summary.failed += 1;
                            },
                        },
                    }
                }
            }
        }
        Ok(summary)
    }
}
