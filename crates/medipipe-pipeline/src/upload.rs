//! Stage two: idempotent upload of staged files to object storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use medipipe_core::PostProcessPolicy;
use medipipe_storage::{ObjectPrefix, Storage, StorageConnector};

use crate::error::PipelineResult;
use crate::postprocess;
use crate::queue::QueueReceiver;

/// Per-worker counters returned when an upload worker exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    pub handled: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Handled {
    Uploaded,
    Skipped,
    Failed,
}

/// Worker loop for the upload stage.
///
/// Each worker connects its own storage client at startup and replaces it
/// after `renew_after` handled items; long-lived clients have been seen to
/// degrade on day-scale batches. A failed renewal keeps the current client.
pub struct UploadWorker {
    id: usize,
    queue: QueueReceiver<PathBuf>,
    connector: Arc<dyn StorageConnector>,
    prefix: ObjectPrefix,
    staged_policy: PostProcessPolicy,
    renew_after: usize,
}

impl UploadWorker {
    pub fn new(
        id: usize,
        queue: QueueReceiver<PathBuf>,
        connector: Arc<dyn StorageConnector>,
        prefix: ObjectPrefix,
        staged_policy: PostProcessPolicy,
        renew_after: usize,
    ) -> Self {
        Self {
            id,
            queue,
            connector,
            prefix,
            staged_policy,
            renew_after,
        }
    }

    /// Run until the upload queue is closed and drained. Failing to open
    /// the initial storage connection is fatal for the worker; per-item
    /// failures are logged and counted.
    pub async fn run(self) -> PipelineResult<UploadStats> {
        let mut storage = self.connector.connect().await?;
        let mut stats = UploadStats::default();
        let mut since_renewal = 0usize;

        while let Some(path) = self.queue.take().await {
            if since_renewal >= self.renew_after {
                match self.connector.connect().await {
                    Ok(fresh) => {
                        storage = fresh;
                        since_renewal = 0;
                        info!(worker = self.id, "Renewed storage client");
                    }
                    Err(e) => {
                        warn!(worker = self.id, error = %e, "Storage client renewal failed, keeping current client");
                    }
                }
            }

            stats.handled += 1;
            match self.handle(storage.as_ref(), &path).await {
                Handled::Uploaded => stats.uploaded += 1,
                Handled::Skipped => stats.skipped += 1,
                Handled::Failed => stats.failed += 1,
            }
            since_renewal += 1;
            self.queue.ack();
        }

        debug!(worker = self.id, "Upload queue drained, upload worker exiting");
        Ok(stats)
    }

    /// Upload one staged file unless its object already exists, then
    /// post-process the local file. A failed upload leaves the file in
    /// the staging directory for manual retry.
    async fn handle(&self, storage: &dyn Storage, path: &Path) -> Handled {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            error!(worker = self.id, path = %path.display(), "Staged path has no usable file name");
            return Handled::Failed;
        };
        let key = self.prefix.key_for(file_name);

        let already_present = match storage.exists(&key).await {
            Ok(present) => present,
            Err(e) => {
                // An unanswerable probe is treated as absent: uploads are
                // idempotent overwrites, a duplicate is harmless.
                warn!(worker = self.id, key = %key, error = %e, "Existence probe failed, treating object as absent");
                false
            }
        };

        if already_present {
            info!(worker = self.id, key = %key, "Object already present, skipping upload");
        } else if let Err(e) = storage.upload_file(&key, path).await {
            error!(worker = self.id, key = %key, path = %path.display(), error = %e, "Upload failed");
            return Handled::Failed;
        }

        if let Err(e) = postprocess::apply(&self.staged_policy, path).await {
            error!(worker = self.id, path = %path.display(), error = %e, "Post-processing staged file failed");
        }

        if already_present {
            Handled::Skipped
        } else {
            Handled::Uploaded
        }
    }
}
