//! Run orchestration: discover, seed, run both worker pools, join them in
//! stage order, and report.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use medipipe_core::PipelineConfig;
use medipipe_storage::{ObjectPrefix, StorageConnector};

use crate::context::PipelineContext;
use crate::discover::discover_inputs;
use crate::error::{PipelineError, PipelineResult};
use crate::transcode::{TranscodeStats, TranscodeWorker, Transcoder};
use crate::upload::{UploadStats, UploadWorker};

/// Aggregated counters for one finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub discovered: usize,
    pub transcoded: usize,
    pub transcode_failures: usize,
    pub uploaded: usize,
    pub upload_skipped: usize,
    pub upload_failures: usize,
}

impl PipelineReport {
    fn absorb_transcode(&mut self, stats: TranscodeStats) {
        self.transcoded += stats.forwarded;
        self.transcode_failures += stats.failed;
    }

    fn absorb_upload(&mut self, stats: UploadStats) {
        self.uploaded += stats.uploaded;
        self.upload_skipped += stats.skipped;
        self.upload_failures += stats.failed;
    }
}

/// One day's batch run over a directory of recordings.
pub struct Pipeline {
    config: PipelineConfig,
    connector: Arc<dyn StorageConnector>,
    prefix: ObjectPrefix,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        connector: Arc<dyn StorageConnector>,
        prefix: ObjectPrefix,
    ) -> Self {
        Self {
            config,
            connector,
            prefix,
        }
    }

    pub async fn run(&self) -> PipelineResult<PipelineReport> {
        self.run_with_context(PipelineContext::new(self.config.queue_capacity))
            .await
    }

    /// Run with an externally built context, so callers can keep a handle
    /// on the completion tracker.
    pub async fn run_with_context(&self, ctx: PipelineContext) -> PipelineResult<PipelineReport> {
        let inputs =
            discover_inputs(&self.config.input_dir, &self.config.camera_tag, self.config.date)
                .await?;
        info!(
            count = inputs.len(),
            dir = %self.config.input_dir.display(),
            date = %self.config.date,
            "Discovered recordings"
        );

        let PipelineContext {
            tracker,
            input_tx,
            input_rx,
            output_tx,
            output_rx,
        } = ctx;
        let input_depth = input_rx.depth_handle();
        let output_depth = output_rx.depth_handle();

        let transcoder = Arc::new(Transcoder::new(&self.config));
        let mut transcode_pool = JoinSet::new();
        for id in 0..self.config.transcode_workers {
            let worker = TranscodeWorker::new(
                id,
                input_rx.clone(),
                output_tx.clone(),
                Arc::clone(&transcoder),
                self.config.original_policy.clone(),
            );
            transcode_pool.spawn(worker.run());
        }

        let mut upload_pool = JoinSet::new();
        for id in 0..self.config.upload_workers {
            let worker = UploadWorker::new(
                id,
                output_rx.clone(),
                Arc::clone(&self.connector),
                self.prefix.clone(),
                self.config.resized_policy.clone(),
                self.config.renew_after,
            );
            upload_pool.spawn(worker.run());
        }

        // The worker pools hold the only remaining receiver clones and the
        // only other sender clone. From here on, channel closure tracks
        // worker lifetimes exactly.
        drop(input_rx);
        drop(output_tx);
        drop(output_rx);

        let mut report = PipelineReport {
            discovered: inputs.len(),
            ..PipelineReport::default()
        };
        let mut first_error: Option<PipelineError> = None;

        for path in inputs {
            if input_tx.push(path).await.is_err() {
                first_error.get_or_insert(PipelineError::Worker(
                    "every transcode worker exited before seeding finished".into(),
                ));
                break;
            }
        }
        // Seeding is the only production into the input queue; dropping the
        // sender is the end-of-input signal.
        drop(input_tx);

        while let Some(joined) = transcode_pool.join_next().await {
            match joined {
                Ok(stats) => report.absorb_transcode(stats),
                Err(e) => {
                    first_error
                        .get_or_insert(PipelineError::Worker(format!("transcode worker: {e}")));
                }
            }
        }
        tracker.transcode.mark_done();
        if !input_depth.is_idle() {
            warn!(
                outstanding = input_depth.outstanding(),
                "Transcode stage finished with unacked items"
            );
        }

        while let Some(joined) = upload_pool.join_next().await {
            match joined {
                Ok(Ok(stats)) => report.absorb_upload(stats),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(PipelineError::Worker(format!("upload worker: {e}")));
                }
            }
        }
        tracker.upload.mark_done();
        if !output_depth.is_idle() {
            warn!(
                outstanding = output_depth.outstanding(),
                "Upload stage finished with unacked items"
            );
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        info!(
            discovered = report.discovered,
            transcoded = report.transcoded,
            transcode_failures = report.transcode_failures,
            uploaded = report.uploaded,
            upload_skipped = report.upload_skipped,
            upload_failures = report.upload_failures,
            "Pipeline run complete"
        );
        Ok(report)
    }
}
