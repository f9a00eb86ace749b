//! medipipe — nightly batch job: transcode one day's camera recordings
//! with GStreamer, then upload the results to object storage.
//!
//! AWS credentials come from the usual environment/profile chain; a
//! `.env` file next to the binary is loaded if present.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;

use medipipe_cli::init_tracing;
use medipipe_core::config::{
    self, ARCHIVE_ORIGINAL, ARCHIVE_RESIZED, DEFAULT_ARCHIVE_ROOT, DEFAULT_STAGING_DIR,
};
use medipipe_core::{OutputProfile, PipelineConfig, PostProcessPolicy, VideoCodec};
use medipipe_pipeline::Pipeline;
use medipipe_storage::{ObjectPrefix, StorageConfig};

#[derive(Parser)]
#[command(
    name = "medipipe",
    about = "Transcode a day's camera recordings and upload them to object storage"
)]
struct Cli {
    /// Directory holding the day's recordings
    #[arg(long)]
    video_folder: PathBuf,

    /// Date to process, YYYY-MM-DD (defaults to yesterday)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Tag a recording's file name must contain
    #[arg(long, default_value = config::DEFAULT_CAMERA_TAG)]
    camera_tag: String,

    /// Source codec of the recordings: mpeg4, h264 or h265
    #[arg(long, default_value = "h265")]
    codec: VideoCodec,

    /// Output width in pixels
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Output bitrate in bits per second
    #[arg(long, default_value_t = 30_000)]
    bitrate: u32,

    /// Delete original recordings instead of archiving them
    #[arg(long)]
    remove_original: bool,

    /// Delete transcoded files after upload instead of archiving them
    #[arg(long)]
    remove_resized: bool,

    /// Directory for transcoded-but-not-yet-uploaded files
    #[arg(long, default_value = DEFAULT_STAGING_DIR)]
    staging_dir: PathBuf,

    /// Root directory for archived files
    #[arg(long, default_value = DEFAULT_ARCHIVE_ROOT)]
    archive_root: PathBuf,

    /// S3 bucket to upload into
    #[arg(long, conflicts_with = "local_dir")]
    bucket: Option<String>,

    /// Remote folder the day's objects are grouped under
    #[arg(long)]
    s3_folder: String,

    /// AWS region of the bucket
    #[arg(long, default_value = "eu-west-1")]
    region: String,

    /// Custom S3 endpoint (MinIO and other S3-compatible providers)
    #[arg(long)]
    endpoint: Option<String>,

    /// Upload into a local directory instead of S3 (debugging)
    #[arg(long)]
    local_dir: Option<PathBuf>,

    /// External transcoder program
    #[arg(long, default_value = config::DEFAULT_LAUNCHER)]
    launcher: PathBuf,

    #[arg(long, default_value_t = config::DEFAULT_TRANSCODE_WORKERS)]
    transcode_workers: usize,

    #[arg(long, default_value_t = config::DEFAULT_UPLOAD_WORKERS)]
    upload_workers: usize,

    /// Buffered item limit of each stage queue
    #[arg(long, default_value_t = config::DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Uploads handled before a worker's storage client is recreated
    #[arg(long, default_value_t = config::DEFAULT_RENEW_AFTER)]
    renew_after: usize,
}

impl Cli {
    fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        match (&self.bucket, &self.local_dir) {
            (Some(bucket), None) => Ok(StorageConfig::S3 {
                bucket: bucket.clone(),
                region: self.region.clone(),
                endpoint: self.endpoint.clone(),
            }),
            (None, Some(dir)) => Ok(StorageConfig::Local {
                base_path: dir.clone(),
            }),
            _ => bail!("either --bucket or --local-dir must be given"),
        }
    }

    fn pipeline_config(&self, date: NaiveDate) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.video_folder.clone(),
            date,
            camera_tag: self.camera_tag.clone(),
            codec: self.codec,
            output: OutputProfile {
                width: self.width,
                height: self.height,
                bitrate: self.bitrate,
            },
            launcher: self.launcher.clone(),
            staging_dir: self.staging_dir.clone(),
            original_policy: PostProcessPolicy::resolve(
                self.remove_original,
                &self.archive_root,
                ARCHIVE_ORIGINAL,
                date,
            ),
            resized_policy: PostProcessPolicy::resolve(
                self.remove_resized,
                &self.archive_root,
                ARCHIVE_RESIZED,
                date,
            ),
            transcode_workers: self.transcode_workers,
            upload_workers: self.upload_workers,
            queue_capacity: self.queue_capacity,
            renew_after: self.renew_after,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let date = cli.date.unwrap_or_else(config::yesterday);

    let storage = cli.storage_config()?;
    let prefix = ObjectPrefix::new(cli.s3_folder.clone(), date);
    let pipeline = Pipeline::new(cli.pipeline_config(date), Arc::new(storage), prefix);

    let report = pipeline
        .run()
        .await
        .with_context(|| format!("Pipeline run for {date} failed"))?;

    println!("Run for {date}:");
    println!("  discovered          {}", report.discovered);
    println!("  transcoded          {}", report.transcoded);
    println!("  transcode failures  {}", report.transcode_failures);
    println!("  uploaded            {}", report.uploaded);
    println!("  upload skipped      {}", report.upload_skipped);
    println!("  upload failures     {}", report.upload_failures);

    if report.transcode_failures > 0 || report.upload_failures > 0 {
        bail!(
            "{} file(s) failed",
            report.transcode_failures + report.upload_failures
        );
    }
    Ok(())
}
