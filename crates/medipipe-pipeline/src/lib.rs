//! Two-stage batch pipeline: transcode camera recordings with an external
//! GStreamer launcher, then upload the results to object storage.
//!
//! The stages are decoupled by bounded work queues and run on independent
//! worker pools. Stage completion is derived from channel closure: the seed
//! loop is the only producer into the transcode queue, and the transcode
//! workers are the only producers into the upload queue, so dropping the
//! last sender of a queue tells its consumers that no further work can
//! arrive. No central scheduler or polling is involved.

pub mod context;
pub mod discover;
pub mod error;
pub mod pipeline;
pub mod postprocess;
pub mod queue;
pub mod tracker;
pub mod transcode;
pub mod upload;

pub use context::PipelineContext;
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineReport};
pub use queue::{bounded, QueueClosed, QueueDepth, QueueReceiver, QueueSender};
pub use tracker::{CompletionTracker, StageFlag};
pub use transcode::{TranscodeOutcome, TranscodeStats, TranscodeWorker, Transcoder};
pub use upload::{UploadStats, UploadWorker};
