//! Pipeline configuration.
//!
//! Typed configuration assembled by the CLI. Defaults live here as constants
//! so the pipeline and the tests agree on the reference values.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::profiles::{OutputProfile, VideoCodec};

// Reference values from the production deployment.
pub const DEFAULT_TRANSCODE_WORKERS: usize = 2;
pub const DEFAULT_UPLOAD_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;
pub const DEFAULT_RENEW_AFTER: usize = 100;
pub const DEFAULT_CAMERA_TAG: &str = "cam0";
pub const DEFAULT_STAGING_DIR: &str = "to_be_uploaded";
pub const DEFAULT_ARCHIVE_ROOT: &str = "archive";
pub const DEFAULT_LAUNCHER: &str = "gst-launch-1.0";

/// Prefix prepended to a transcoded file's name in the staging directory.
pub const RESIZED_PREFIX: &str = "resized_";

/// Subdirectory of the archive root holding original inputs.
pub const ARCHIVE_ORIGINAL: &str = "original";
/// Subdirectory of the archive root holding transcoded outputs.
pub const ARCHIVE_RESIZED: &str = "resized";

/// Terminal action taken on a file after its stage has handled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessPolicy {
    /// Delete the file.
    Remove,
    /// Move the file into `dir`, creating it if absent. The directory is
    /// already namespaced by the configured date.
    Archive { dir: PathBuf },
}

impl PostProcessPolicy {
    /// Resolve the policy for one stage: remove, or archive under
    /// `<archive_root>/<stage_subdir>/<date>`.
    pub fn resolve(remove: bool, archive_root: &Path, stage_subdir: &str, date: NaiveDate) -> Self {
        if remove {
            PostProcessPolicy::Remove
        } else {
            PostProcessPolicy::Archive {
                dir: archive_root
                    .join(stage_subdir)
                    .join(date.format("%Y-%m-%d").to_string()),
            }
        }
    }
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the day's recordings.
    pub input_dir: PathBuf,
    /// Date stamp the recordings are filtered by.
    pub date: NaiveDate,
    /// Camera tag that must appear in a recording's file name.
    pub camera_tag: String,
    pub codec: VideoCodec,
    pub output: OutputProfile,
    /// External transcoder program.
    pub launcher: PathBuf,
    /// Directory for transcoded-but-not-yet-uploaded files.
    pub staging_dir: PathBuf,
    /// Applied to each input file once its transcode has been attempted.
    pub original_policy: PostProcessPolicy,
    /// Applied to each transcoded file once its upload step has run.
    pub resized_policy: PostProcessPolicy,
    pub transcode_workers: usize,
    pub upload_workers: usize,
    pub queue_capacity: usize,
    /// Upload operations handled before the storage client is recreated.
    pub renew_after: usize,
}

/// Yesterday's date, the default processing target for the nightly run.
pub fn yesterday() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_resolves_to_remove() {
        let policy = PostProcessPolicy::resolve(
            true,
            Path::new("archive"),
            ARCHIVE_ORIGINAL,
            NaiveDate::from_ymd_opt(2020, 11, 15).unwrap(),
        );
        assert_eq!(policy, PostProcessPolicy::Remove);
    }

    #[test]
    fn policy_resolves_to_dated_archive_dir() {
        let policy = PostProcessPolicy::resolve(
            false,
            Path::new("archive"),
            ARCHIVE_RESIZED,
            NaiveDate::from_ymd_opt(2020, 11, 15).unwrap(),
        );
        assert_eq!(
            policy,
            PostProcessPolicy::Archive {
                dir: PathBuf::from("archive/resized/2020-11-15"),
            }
        );
    }

    #[test]
    fn yesterday_precedes_today() {
        let today = Local::now().date_naive();
        assert!(yesterday() < today);
    }
}
