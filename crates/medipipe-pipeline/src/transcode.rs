//! Stage one: run the external GStreamer launcher over each input.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, error, info};

use medipipe_core::config::RESIZED_PREFIX;
use medipipe_core::{OutputProfile, PipelineConfig, PostProcessPolicy, VideoCodec};

use crate::postprocess;
use crate::queue::{QueueReceiver, QueueSender};

/// Exit code substituted when the launcher is killed by a signal, so a
/// signal death is never mistaken for the warning exit.
const SIGNAL_EXIT_CODE: i32 = 255;

/// Builds and runs the launcher invocations for one configuration.
pub struct Transcoder {
    launcher: PathBuf,
    codec: VideoCodec,
    output: OutputProfile,
    staging_dir: PathBuf,
}

impl Transcoder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            launcher: config.launcher.clone(),
            codec: config.codec,
            output: config.output,
            staging_dir: config.staging_dir.clone(),
        }
    }

    /// Staging path of the transcoded output for `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.staging_dir.join(format!("{RESIZED_PREFIX}{name}"))
    }

    /// The launcher argument list for one input/output pair: a demux,
    /// parse, decode, scale, re-encode, remux chain ending in a filesink.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let caps = format!(
            "video/x-raw(memory:NVMM), width=(int){}, height=(int){}, format=(string)I420",
            self.output.width, self.output.height
        );
        vec![
            "filesrc".into(),
            format!("location={}", input.display()),
            "!".into(),
            VideoCodec::DEMUX_ELEMENT.into(),
            "!".into(),
            self.codec.parse_element().into(),
            "!".into(),
            self.codec.decode_element().into(),
            "!".into(),
            "nvvidconv".into(),
            "!".into(),
            caps,
            "!".into(),
            "omxh264enc".into(),
            format!("bitrate={}", self.output.bitrate),
            "!".into(),
            "qtmux".into(),
            "!".into(),
            "filesink".into(),
            format!("location={}", output.display()),
        ]
    }

    /// Run the launcher to completion and capture its output. An `Err`
    /// means the process could not be spawned at all; a spawned process
    /// that fails is reported through [`TranscodeOutcome::exit_code`].
    pub async fn run(&self, input: &Path) -> std::io::Result<TranscodeOutcome> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;
        let output_path = self.output_path(input);
        let args = self.build_args(input, &output_path);

        let captured = Command::new(&self.launcher)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(TranscodeOutcome {
            exit_code: captured.status.code().unwrap_or(SIGNAL_EXIT_CODE),
            stdout: String::from_utf8_lossy(&captured.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&captured.stderr).into_owned(),
            output_path,
        })
    }
}

/// Result of one launcher invocation.
#[derive(Debug)]
pub struct TranscodeOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub output_path: PathBuf,
}

impl TranscodeOutcome {
    /// gst-launch exits with status 1 when the pipeline ran but emitted
    /// warnings; the output file is still usable, so both 0 and 1 count
    /// as success.
    pub fn accepted(&self) -> bool {
        self.exit_code <= 1
    }
}

/// Per-worker counters returned when a transcode worker exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeStats {
    pub handled: usize,
    pub forwarded: usize,
    pub failed: usize,
}

/// Worker loop for the transcode stage: take an input, run the launcher,
/// forward the verified output, post-process the input.
pub struct TranscodeWorker {
    id: usize,
    input: QueueReceiver<PathBuf>,
    output: QueueSender<PathBuf>,
    transcoder: Arc<Transcoder>,
    input_policy: PostProcessPolicy,
}

impl TranscodeWorker {
    pub fn new(
        id: usize,
        input: QueueReceiver<PathBuf>,
        output: QueueSender<PathBuf>,
        transcoder: Arc<Transcoder>,
        input_policy: PostProcessPolicy,
    ) -> Self {
        Self {
            id,
            input,
            output,
            transcoder,
            input_policy,
        }
    }

    pub async fn run(self) -> TranscodeStats {
        let mut stats = TranscodeStats::default();
        while let Some(input) = self.input.take().await {
            stats.handled += 1;
            if self.handle(&input).await {
                stats.forwarded += 1;
            } else {
                stats.failed += 1;
            }
            self.input.ack();
        }
        debug!(worker = self.id, "Input queue drained, transcode worker exiting");
        stats
    }

    /// Process one input. Returns whether its output was forwarded to the
    /// upload stage. The input file is post-processed either way, so a
    /// failed recording cannot be retried into the next nightly run.
    async fn handle(&self, input: &Path) -> bool {
        info!(worker = self.id, path = %input.display(), "Transcoding");
        let forwarded = match self.transcoder.run(input).await {
            Ok(outcome) if outcome.accepted() => {
                debug!(worker = self.id, exit_code = outcome.exit_code, stdout = %outcome.stdout, "Transcoder finished");
                self.forward(input, outcome).await
            }
            Ok(outcome) => {
                error!(
                    worker = self.id,
                    path = %input.display(),
                    exit_code = outcome.exit_code,
                    stderr = %outcome.stderr,
                    "Transcode failed"
                );
                false
            }
            Err(e) => {
                error!(worker = self.id, path = %input.display(), error = %e, "Failed to launch transcoder");
                false
            }
        };

        if let Err(e) = postprocess::apply(&self.input_policy, input).await {
            error!(worker = self.id, path = %input.display(), error = %e, "Post-processing input failed");
        }
        forwarded
    }

    async fn forward(&self, input: &Path, outcome: TranscodeOutcome) -> bool {
        // The launcher can exit zero without writing anything (empty
        // pipeline negotiation); only verified files are enqueued.
        match tokio::fs::try_exists(&outcome.output_path).await {
            Ok(true) => match self.output.push(outcome.output_path.clone()).await {
                Ok(()) => true,
                Err(e) => {
                    error!(worker = self.id, path = %outcome.output_path.display(), error = %e, "Upload queue rejected output");
                    false
                }
            },
            _ => {
                error!(
                    worker = self.id,
                    path = %input.display(),
                    expected = %outcome.output_path.display(),
                    "Transcoder reported success but produced no output file"
                );
                false
            }
        }
    }
}
