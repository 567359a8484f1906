//! Watching the open document for changes made by other programs.
//!
//! The parent directory is watched rather than the file, since many editors
//! save by writing a temporary file and renaming it over the original.
//! Bursts of events are debounced into one [`FileChange`], and a save made by
//! richmark itself can be muted so it does not come back as an external edit.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// What happened to the document once events settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// The file exists and may have new contents.
    Modified,
    /// The file is gone.
    Removed,
}

/// Collapses a burst of events into one notification after a quiet period.
#[derive(Debug, Clone)]
struct Debouncer {
    quiet: Duration,
    last_event: Option<Instant>,
    muted_until: Option<Instant>,
}

impl Debouncer {
    const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_event: None,
            muted_until: None,
        }
    }

    fn mute(&mut self, now: Instant, window: Duration) {
        self.muted_until = Some(now + window);
        self.last_event = None;
    }

    /// Record an event. Returns false when it was swallowed by a mute.
    fn record(&mut self, now: Instant) -> bool {
        if self.muted_until.is_some_and(|until| now < until) {
            return false;
        }
        self.muted_until = None;
        self.last_event = Some(now);
        true
    }

    fn fire(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.duration_since(at) >= self.quiet => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches a single document and reports debounced changes.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    path: PathBuf,
    name: Option<OsString>,
    debouncer: Debouncer,
}

impl DocumentWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// containing directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, quiet: Duration) -> notify::Result<Self> {
        let requested = path.as_ref();
        // Event paths are canonical on every platform notify supports.
        let path = requested
            .canonicalize()
            .unwrap_or_else(|_| requested.to_path_buf());
        let dir = parent_dir(&path);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver only disappears when the editor shuts down.
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), dir = %dir.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            events,
            name: path.file_name().map(ToOwned::to_owned),
            dir,
            path,
            debouncer: Debouncer::new(quiet),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ignore events for `window`, e.g. right after saving the file ourselves.
    pub fn mute_for(&mut self, window: Duration) {
        self.debouncer.mute(Instant::now(), window);
    }

    /// Drain pending events and report a change once they have settled.
    pub fn poll_change(&mut self) -> Option<FileChange> {
        let now = Instant::now();
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(ev) if self.concerns_document(&ev) => {
                    if !self.debouncer.record(now) {
                        tracing::trace!(kind = ?ev.kind, "watch event muted");
                    }
                }
                Ok(ev) => tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "unrelated watch event"),
                Err(err) => tracing::warn!(error = %err, "file watcher error"),
            }
        }

        if !self.debouncer.fire(now) {
            return None;
        }
        let change = if self.path.exists() {
            FileChange::Modified
        } else {
            FileChange::Removed
        };
        tracing::debug!(?change, path = %self.path.display(), "document changed on disk");
        Some(change)
    }

    /// Whether an event may have touched the document. Directory-level events
    /// count because some backends only report the directory.
    fn concerns_document(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| {
            p == &self.dir
                || p == &self.path
                || self.name.as_deref().is_some_and(|name| p.file_name() == Some(name))
        })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event_for(path: PathBuf) -> Event {
        Event {
            kind: EventKind::Any,
            paths: vec![path],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    fn wait_for_change(watcher: &mut DocumentWatcher, within: Duration) -> Option<FileChange> {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if let Some(change) = watcher.poll_change() {
                return Some(change);
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        None
    }

    fn watched_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap().join("flyer.html");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_debouncer_waits_for_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(debouncer.record(start));
        assert!(!debouncer.fire(start + Duration::from_millis(50)));
        assert!(debouncer.record(start + Duration::from_millis(80)));
        assert!(!debouncer.fire(start + Duration::from_millis(150)));
        assert!(debouncer.fire(start + Duration::from_millis(200)));
        assert!(!debouncer.fire(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_debouncer_mute_swallows_events_until_window_ends() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        assert!(debouncer.record(start));
        debouncer.mute(start, Duration::from_millis(500));
        assert!(!debouncer.fire(start + Duration::from_millis(20)));
        assert!(!debouncer.record(start + Duration::from_millis(100)));
        assert!(debouncer.record(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_directory_and_document_events_concern_document() {
        let (_dir, path) = watched_file("<p>hi</p>");
        let watcher = DocumentWatcher::new(&path, Duration::from_millis(10)).unwrap();
        assert!(watcher.concerns_document(&event_for(path.clone())));
        assert!(watcher.concerns_document(&event_for(parent_dir(&path))));
    }

    #[test]
    fn test_sibling_file_event_is_ignored() {
        let (_dir, path) = watched_file("<p>hi</p>");
        let watcher = DocumentWatcher::new(&path, Duration::from_millis(10)).unwrap();
        let sibling = parent_dir(&path).join("other.html");
        assert!(!watcher.concerns_document(&event_for(sibling)));
    }

    #[test]
    fn test_parent_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(parent_dir(Path::new("flyer.html")), PathBuf::from("."));
    }

    #[test]
    fn test_external_write_is_reported_as_modified() {
        let (_dir, path) = watched_file("<p>a</p>");
        let mut watcher = DocumentWatcher::new(&path, Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(300));

        std::fs::write(&path, "<p>b</p>").unwrap();
        assert_eq!(
            wait_for_change(&mut watcher, Duration::from_secs(5)),
            Some(FileChange::Modified)
        );
    }

    #[test]
    fn test_deleted_file_is_reported_as_removed() {
        let (_dir, path) = watched_file("<p>a</p>");
        let mut watcher = DocumentWatcher::new(&path, Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(300));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            wait_for_change(&mut watcher, Duration::from_secs(5)),
            Some(FileChange::Removed)
        );
    }

    #[test]
    fn test_muted_save_is_not_reported() {
        let (_dir, path) = watched_file("<p>a</p>");
        let mut watcher = DocumentWatcher::new(&path, Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(300));

        watcher.mute_for(Duration::from_secs(10));
        std::fs::write(&path, "<p>saved</p>").unwrap();
        assert_eq!(wait_for_change(&mut watcher, Duration::from_millis(800)), None);
    }
}
