//! Background saving of documents
//!
//! Saves never run on the thread that owns the coordinator. Each one is
//! dispatched to tokio's blocking pool and its outcome is reported back
//! over the coordinator's event channel, keyed by `DocumentId`.

use super::DocumentId;
use crate::shutdown::ShutdownContext;
use crate::tab::CoordinatorEvent;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinError;

/// Snapshot of a document taken when a save is requested
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub id: DocumentId,
    pub path: Option<PathBuf>,
    pub encoding: Option<String>,
    pub offset: usize,
    pub text: String,
    pub modified: bool,
    pub revision: u64,
    /// Lets the saver observe that the application is exiting
    pub shutdown: ShutdownContext,
}

/// Persists document contents. Implementations run on a blocking thread.
pub trait DocumentSaver: Send + Sync {
    fn save(&self, request: &SaveRequest) -> Result<()>;
}

/// Saver that writes modified file-backed documents to disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSaver;

impl DocumentSaver for FsSaver {
    fn save(&self, request: &SaveRequest) -> Result<()> {
        let Some(path) = request.path.as_deref() else {
            return Ok(());
        };
        if !request.modified {
            return Ok(());
        }
        write_atomically(path, request.text.as_bytes())
            .with_context(|| format!("Failed to save {}", path.display()))?;
        log::debug!("Saved {} ({} bytes)", path.display(), request.text.len());
        Ok(())
    }
}

/// Write to a sibling temp file then rename over the target
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

/// How a background save ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
    /// The save did not finish within the shutdown timeout
    TimedOut,
}

impl SaveOutcome {
    fn from_join(joined: std::result::Result<Result<()>, JoinError>) -> Self {
        match joined {
            Ok(Ok(())) => SaveOutcome::Saved,
            Ok(Err(e)) => SaveOutcome::Failed(format!("{e:#}")),
            Err(e) => SaveOutcome::Failed(format!("save task aborted: {e}")),
        }
    }
}

/// Completion of a save-then-close, carrying what the ledger needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub id: DocumentId,
    pub path: Option<PathBuf>,
    pub encoding: Option<String>,
    pub offset: usize,
    pub outcome: SaveOutcome,
    /// Started by the exit sequence rather than by the user
    pub for_exit: bool,
}

/// Why a save was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveKind {
    Close { exit: bool },
    AutoSave,
}

/// Run `request` on the blocking pool and report back on `events`
pub(crate) fn spawn_save(
    runtime: &Handle,
    saver: Arc<dyn DocumentSaver>,
    request: SaveRequest,
    kind: SaveKind,
    timeout: Option<Duration>,
    events: UnboundedSender<CoordinatorEvent>,
) {
    runtime.spawn(async move {
        let id = request.id;
        let revision = request.revision;
        let path = request.path.clone();
        let encoding = request.encoding.clone();
        let offset = request.offset;

        let job = tokio::task::spawn_blocking(move || saver.save(&request));
        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, job).await {
                Ok(joined) => SaveOutcome::from_join(joined),
                Err(_) => {
                    log::warn!("Save of document {} did not finish within {:?}", id, limit);
                    SaveOutcome::TimedOut
                }
            },
            None => SaveOutcome::from_join(job.await),
        };

        let event = match kind {
            SaveKind::Close { exit } => CoordinatorEvent::CloseCompleted(CloseReport {
                id,
                path,
                encoding,
                offset,
                outcome,
                for_exit: exit,
            }),
            SaveKind::AutoSave => CoordinatorEvent::AutoSaveCompleted {
                id,
                revision,
                outcome,
            },
        };
        if events.send(event).is_err() {
            log::debug!("Coordinator gone before save of document {} completed", id);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(path: Option<PathBuf>, modified: bool) -> SaveRequest {
        SaveRequest {
            id: 1,
            path,
            encoding: Some("UTF-8".to_string()),
            offset: 0,
            text: "contents".to_string(),
            modified,
            revision: 1,
            shutdown: ShutdownContext::new(),
        }
    }

    #[test]
    fn fs_saver_writes_modified_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "old").unwrap();

        FsSaver.save(&request(Some(path.clone()), true)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "contents");
        assert!(!dir.path().join("doc.txt.tmp").exists());
    }

    #[test]
    fn fs_saver_skips_clean_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "old").unwrap();

        FsSaver.save(&request(Some(path.clone()), false)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn fs_saver_ignores_unsaved_documents() {
        assert!(FsSaver.save(&request(None, true)).is_ok());
    }

    #[test]
    fn fs_saver_reports_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("doc.txt");
        let err = FsSaver.save(&request(Some(path), true)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to save"));
    }

    #[tokio::test]
    async fn spawn_save_reports_close_completion() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        spawn_save(
            &Handle::current(),
            Arc::new(FsSaver),
            request(None, false),
            SaveKind::Close { exit: true },
            None,
            tx,
        );
        match rx.recv().await {
            Some(CoordinatorEvent::CloseCompleted(report)) => {
                assert_eq!(report.id, 1);
                assert_eq!(report.outcome, SaveOutcome::Saved);
                assert!(report.for_exit);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    struct SlowSaver;

    impl DocumentSaver for SlowSaver {
        fn save(&self, _request: &SaveRequest) -> Result<()> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }
    }

    #[tokio::test]
    async fn spawn_save_times_out() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        spawn_save(
            &Handle::current(),
            Arc::new(SlowSaver),
            request(None, true),
            SaveKind::AutoSave,
            Some(Duration::from_millis(20)),
            tx,
        );
        match rx.recv().await {
            Some(CoordinatorEvent::AutoSaveCompleted { outcome, .. }) => {
                assert_eq!(outcome, SaveOutcome::TimedOut);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
