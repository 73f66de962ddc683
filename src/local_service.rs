use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cache_system::CacheManager;
use crate::document::{DocumentService, DocumentSnapshot, SubmitReceipt};
use crate::mutation::MutationRequest;
use crate::shared_utils::validate_presentation_id;

/// File-backed document service.
///
/// Snapshots live at `<workspace>/<id>.json`; every submitted batch is
/// appended as one JSON line to `<workspace>/<id>.mutations.jsonl`.
pub struct LocalDocumentService {
    workspace: PathBuf,
    cache: Option<CacheManager<DocumentSnapshot>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JournalEntry<'a> {
    presentation_id: &'a str,
    submitted_at: chrono::DateTime<chrono::Utc>,
    requests: &'a [MutationRequest],
}

impl LocalDocumentService {
    pub fn new(workspace: impl Into<PathBuf>, use_cache: bool) -> Self {
        Self {
            workspace: workspace.into(),
            cache: use_cache.then(CacheManager::new),
        }
    }

    pub fn snapshot_path(&self, presentation_id: &str) -> PathBuf {
        self.workspace.join(format!("{}.json", presentation_id))
    }

    pub fn journal_path(&self, presentation_id: &str) -> PathBuf {
        self.workspace.join(format!("{}.mutations.jsonl", presentation_id))
    }

    /// Drop stale snapshots, then report (entries, slides, elements) held in the cache
    pub fn cache_stats(&self) -> Option<(usize, usize, usize)> {
        self.cache.as_ref().map(|cache| {
            cache.cleanup();
            cache.get_stats()
        })
    }

    fn checked_id(presentation_id: &str) -> Result<()> {
        validate_presentation_id(presentation_id).map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}

fn read_snapshot(file_path: &str) -> Result<DocumentSnapshot> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open document snapshot: {}", file_path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse document snapshot: {}", file_path))
}

impl DocumentService for LocalDocumentService {
    fn fetch_document(&self, presentation_id: &str) -> Result<DocumentSnapshot> {
        Self::checked_id(presentation_id)?;
        let path = self.snapshot_path(presentation_id);
        let path = path.to_string_lossy();

        let snapshot = match &self.cache {
            Some(cache) => cache.get_or_cache(&path, read_snapshot)?,
            None => read_snapshot(&path)?,
        };

        if snapshot.presentation_id != presentation_id {
            log::warn!(
                "Snapshot {} declares presentation id {}",
                path,
                snapshot.presentation_id
            );
        }

        Ok(snapshot)
    }

    fn submit_mutations(
        &self,
        presentation_id: &str,
        requests: &[MutationRequest],
    ) -> Result<SubmitReceipt> {
        Self::checked_id(presentation_id)?;
        let path = self.journal_path(presentation_id);

        let entry = JournalEntry {
            presentation_id,
            submitted_at: chrono::Utc::now(),
            requests,
        };
        let line = serde_json::to_string(&entry).context("Failed to serialize mutation batch")?;

        let mut journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open mutation journal: {}", path.display()))?;
        writeln!(journal, "{}", line)
            .with_context(|| format!("Failed to write mutation journal: {}", path.display()))?;

        // The deck has moved on; re-read the snapshot on the next fetch
        if let Some(cache) = &self.cache {
            cache.invalidate(&self.snapshot_path(presentation_id).to_string_lossy());
        }

        let kinds: Vec<&str> = requests.iter().map(MutationRequest::kind).collect();
        log::info!(
            "Recorded {} mutation(s) for {}: {:?}",
            requests.len(),
            presentation_id,
            kinds
        );

        Ok(SubmitReceipt {
            presentation_id: presentation_id.to_string(),
            applied: requests.len(),
        })
    }
}
