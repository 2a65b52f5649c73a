//! The output tree: `out/<Composer>/<Work>/<filename>`.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Suffix for in-flight writes. Renamed away on completion, so a crashed run
/// can never leave a partial file that passes the presence check.
pub const PARTIAL_SUFFIX: &str = ".part";

/// What the dedup scan found for one numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// No matching file; the artifact must be fetched.
    Absent,
    /// Exactly one match; the artifact is already downloaded.
    Present(PathBuf),
    /// More than one match. Ambiguous state that requires manual cleanup;
    /// the whole run must stop.
    Ambiguous(Vec<PathBuf>),
}

/// Filesystem store for downloaded scores.
///
/// A single crawl process is assumed to own the output directory for its
/// duration; the store performs no locking.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    root: PathBuf,
}

impl ScoreStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target directory for one work, with path separators in the names
    /// substituted so catalog titles cannot introduce extra path levels.
    pub fn work_dir(&self, composer: &str, work: &str) -> PathBuf {
        self.root.join(sanitize_segment(composer)).join(sanitize_segment(work))
    }

    /// Scans `dir` for files matching `IMSLP<numeric_id>*`, the idempotence
    /// marker. A missing directory means nothing was downloaded yet.
    /// In-flight `.part` files never count as present.
    #[instrument(skip(self, dir))]
    pub fn presence(&self, dir: &Path, numeric_id: u64) -> Result<Presence> {
        let prefix = format!("IMSLP{numeric_id}");
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Presence::Absent),
            Err(e) => return Err(map_io_error(e, dir).into()),
        };
        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| map_io_error(e, dir))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && !name.ends_with(PARTIAL_SUFFIX) {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(match matches.len() {
            0 => Presence::Absent,
            1 => Presence::Present(matches.remove(0)),
            _ => Presence::Ambiguous(matches),
        })
    }

    /// Writes an artifact under `dir`, creating the directory as needed.
    ///
    /// The content lands in a `.part` sibling first and is renamed into
    /// place, so a partial write is never mistaken for a complete artifact.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub fn write(&self, dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let filename = sanitize_segment(filename);
        fs::create_dir_all(dir).map_err(|e| map_io_error(e, dir))?;
        let target = dir.join(&filename);
        let staging = dir.join(format!("{filename}{PARTIAL_SUFFIX}"));
        fs::write(&staging, content).map_err(|e| map_io_error(e, &staging))?;
        fs::rename(&staging, &target).map_err(|e| map_io_error(e, &target))?;
        Ok(target)
    }
}

/// Replaces path-separator characters so a name is always one path segment.
pub fn sanitize_segment(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        IoErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        IoErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Mass in B minor, BWV 232"), "Mass in B minor, BWV 232");
        assert_eq!(sanitize_segment("Sonata 1/2"), "Sonata 1_2");
        assert_eq!(sanitize_segment("a\\b/c"), "a_b_c");
    }

    #[test]
    fn test_work_dir_layout() {
        let store = ScoreStore::new("out");
        assert_eq!(
            store.work_dir("Bach, Johann Sebastian", "Mass in B minor, BWV 232"),
            Path::new("out/Bach, Johann Sebastian/Mass in B minor, BWV 232")
        );
    }

    #[test]
    fn test_presence_absent_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        let missing = dir.path().join("Composer/Work");
        assert_eq!(store.presence(&missing, 42).unwrap(), Presence::Absent);
    }

    #[test]
    fn test_presence_single_match() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        fs::write(dir.path().join("IMSLP42_foo.pdf"), b"pdf").unwrap();
        fs::write(dir.path().join("IMSLP7_other.pdf"), b"pdf").unwrap();
        let presence = store.presence(dir.path(), 42).unwrap();
        assert_eq!(presence, Presence::Present(dir.path().join("IMSLP42_foo.pdf")));
    }

    #[test]
    fn test_presence_ambiguous_on_two_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        fs::write(dir.path().join("IMSLP42_a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("IMSLP42_b.pdf"), b"b").unwrap();
        match store.presence(dir.path(), 42).unwrap() {
            Presence::Ambiguous(files) => assert_eq!(files.len(), 2),
            other => panic!("expected ambiguous state, got {other:?}"),
        }
    }

    #[test]
    fn test_presence_ignores_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        fs::write(dir.path().join("IMSLP42_foo.pdf.part"), b"partial").unwrap();
        assert_eq!(store.presence(dir.path(), 42).unwrap(), Presence::Absent);
    }

    #[test]
    fn test_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        let target_dir = store.work_dir("Bach, Johann Sebastian", "Mass in B minor, BWV 232");
        let path = store.write(&target_dir, "IMSLP12345-BWV232.pdf", b"%PDF-content").unwrap();
        assert_eq!(path.file_name().unwrap(), "IMSLP12345-BWV232.pdf");
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-content");
        // Re-scanning recovers exactly the written artifact.
        assert_eq!(store.presence(&target_dir, 12345).unwrap(), Presence::Present(path));
    }

    #[test]
    fn test_write_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        store.write(dir.path(), "IMSLP1.pdf", b"x").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["IMSLP1.pdf"]);
    }
}
