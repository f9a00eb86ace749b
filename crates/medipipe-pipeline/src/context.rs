//! Per-run shared state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::queue::{bounded, QueueReceiver, QueueSender};
use crate::tracker::CompletionTracker;

/// Queues and completion flags for one pipeline run.
///
/// Constructed fresh per run and handed to [`Pipeline::run_with_context`];
/// nothing here outlives the run. The orchestrator destructures it and
/// drops each handle as soon as it has been distributed, so that queue
/// closure tracks the real set of live producers and consumers.
///
/// [`Pipeline::run_with_context`]: crate::pipeline::Pipeline::run_with_context
pub struct PipelineContext {
    pub tracker: Arc<CompletionTracker>,
    pub input_tx: QueueSender<PathBuf>,
    pub input_rx: QueueReceiver<PathBuf>,
    pub output_tx: QueueSender<PathBuf>,
    pub output_rx: QueueReceiver<PathBuf>,
}

impl PipelineContext {
    pub fn new(queue_capacity: usize) -> Self {
        let (input_tx, input_rx) = bounded(queue_capacity);
        let (output_tx, output_rx) = bounded(queue_capacity);
        Self {
            tracker: Arc::new(CompletionTracker::new()),
            input_tx,
            input_rx,
            output_tx,
            output_rx,
        }
    }
}
