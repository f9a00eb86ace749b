//! Input discovery: find one day's recordings for one camera.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{PipelineError, PipelineResult};

/// True for file names of the form `*<camera_tag>*_record_<date>*.mp4`,
/// with the camera tag appearing before the recording timestamp.
pub fn matches_recording(name: &str, camera_tag: &str, date: NaiveDate) -> bool {
    if !name.ends_with(".mp4") {
        return false;
    }
    let stamp = format!("_record_{}", date.format("%Y-%m-%d"));
    match (name.find(camera_tag), name.find(&stamp)) {
        (Some(tag_at), Some(stamp_at)) => tag_at <= stamp_at,
        _ => false,
    }
}

/// List the matching recordings in `dir`, sorted by path for a stable
/// seeding order. Subdirectories are not descended into.
pub async fn discover_inputs(
    dir: &Path,
    camera_tag: &str,
    date: NaiveDate,
) -> PipelineResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|source| {
        PipelineError::InputDir {
            path: dir.to_path_buf(),
            source,
        }
    })?;

    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if matches_recording(name, camera_tag, date) {
                found.push(entry.path());
            }
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 11, 15).unwrap()
    }

    #[test]
    fn matches_tagged_recordings_only() {
        assert!(matches_recording(
            "site1_cam0_record_2020-11-15_0001.mp4",
            "cam0",
            day()
        ));
        // Wrong camera.
        assert!(!matches_recording(
            "site1_cam1_record_2020-11-15_0001.mp4",
            "cam0",
            day()
        ));
        // Wrong day.
        assert!(!matches_recording(
            "site1_cam0_record_2020-11-16_0001.mp4",
            "cam0",
            day()
        ));
        // Wrong extension.
        assert!(!matches_recording(
            "site1_cam0_record_2020-11-15_0001.mkv",
            "cam0",
            day()
        ));
        // Tag after the timestamp does not count.
        assert!(!matches_recording(
            "x_record_2020-11-15_cam0.mp4",
            "cam0",
            day()
        ));
    }

    #[tokio::test]
    async fn lists_sorted_and_skips_non_matches() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "cam0_record_2020-11-15_0002.mp4",
            "cam0_record_2020-11-15_0001.mp4",
            "cam0_record_2020-11-14_0001.mp4",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("cam0_record_2020-11-15_dir.mp4")).unwrap();

        let found = discover_inputs(dir.path(), "cam0", day()).await.unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "cam0_record_2020-11-15_0001.mp4",
                "cam0_record_2020-11-15_0002.mp4",
            ]
        );
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_inputs(&missing, "cam0", day()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InputDir { .. }));
    }
}
