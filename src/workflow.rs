use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{EpisubError, Result};
use crate::filename::{self, Identifier};
use crate::subtitle::{self, SubtitleFormat};
use crate::validator::{self, Anomaly};

/// Counts reported at the end of a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub found: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Converted,
    Skipped,
}

pub struct Workflow {
    config: Config,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Files directly inside `input_dir` whose name ends with `extension`,
    /// sorted by path. Subdirectories are not descended into.
    pub fn discover<P: AsRef<Path>>(input_dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let input_dir = input_dir.as_ref();

        if !input_dir.is_dir() {
            return Err(EpisubError::InvalidInputDirectory(input_dir.display().to_string()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(extension))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        info!("Found {} files matching *{} in {}", files.len(), extension, input_dir.display());
        Ok(files)
    }

    /// Convert every matching subtitle in `input_dir`.
    ///
    /// Output goes to `output_dir`, or to the configured folder inside
    /// `input_dir`. A failing file is logged and counted; the rest of the
    /// batch still runs.
    pub async fn convert_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<Q>,
    ) -> Result<ConversionSummary> {
        let input_dir = input_dir.as_ref();
        let convert = &self.config.convert;

        let files = Self::discover(input_dir, &convert.input_extension)?;
        let input_format = SubtitleFormat::from_extension(&convert.input_extension)?;

        let output_root = match output_dir {
            Some(dir) => dir.as_ref().to_path_buf(),
            None => input_dir.join(&convert.output_dir_name),
        };
        fs::create_dir_all(&output_root).await?;
        info!("Output directory: {}", output_root.display());

        let mut summary = ConversionSummary {
            found: files.len(),
            ..Default::default()
        };

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"));

        for path in &files {
            pb.set_message(path.file_name().unwrap_or_default().to_string_lossy().to_string());

            match self.convert_file(path, input_format, &output_root).await {
                Ok(FileOutcome::Converted) => summary.converted += 1,
                Ok(FileOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    warn!("Failed to convert {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "Conversion finished: {} found, {} converted, {} skipped, {} failed",
            summary.found, summary.converted, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    async fn convert_file(
        &self,
        input_path: &Path,
        input_format: SubtitleFormat,
        output_root: &Path,
    ) -> Result<FileOutcome> {
        let convert = &self.config.convert;
        info!("Began processing {}", input_path.display());

        let file_name = input_path.file_name()
            .ok_or_else(|| EpisubError::Config("Invalid subtitle filename".to_string()))?
            .to_string_lossy();
        let stem = file_name.strip_suffix(convert.input_extension.as_str()).unwrap_or(file_name.as_ref());

        let target_dir = if convert.flat {
            output_root.to_path_buf()
        } else {
            output_root.join(filename::show_folder(stem, &convert.release_tag))
        };
        fs::create_dir_all(&target_dir).await?;

        let output_path = target_dir.join(format!("{}.{}", stem, convert.target_format.extension()));
        if !convert.overwrite && fs::try_exists(&output_path).await? {
            debug!("Skipping {}, {} already exists", input_path.display(), output_path.display());
            return Ok(FileOutcome::Skipped);
        }

        let mut cues = subtitle::load(input_path, input_format).await?;
        subtitle::strip_entities(&mut cues, &convert.strip_entities);
        subtitle::save(&cues, &output_path, convert.target_format).await?;

        Ok(FileOutcome::Converted)
    }

    /// Parse every matching filename in `input_dir` and validate the
    /// resulting season/episode sequences
    pub fn check_directory<P: AsRef<Path>>(&self, input_dir: P) -> Result<Vec<Anomaly>> {
        let files = Self::discover(input_dir, &self.config.check.input_extension)?;

        let identifiers: Vec<Identifier> = files
            .iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy();
                let parsed = filename::parse(&name);
                if parsed.is_none() {
                    debug!("No season/episode marker in {}, skipping", name);
                }
                parsed
            })
            .collect();

        info!("Parsed {} of {} filenames", identifiers.len(), files.len());

        let anomalies = validator::validate(&identifiers);
        info!("Found {} anomalies", anomalies.len());
        Ok(anomalies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VTT: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n&lrm;Hello\n";

    fn touch(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn workflow() -> Workflow {
        Workflow::new(Config::default()).unwrap()
    }

    #[test]
    fn test_discover_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.vtt", VTT);
        let err = Workflow::discover(dir.path().join("a.vtt"), ".vtt").unwrap_err();
        assert!(matches!(err, EpisubError::InvalidInputDirectory(_)));
        assert!(err.to_string().starts_with("Not a valid directory: "));
    }

    #[test]
    fn test_discover_is_case_sensitive_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.vtt", VTT);
        touch(dir.path(), "a.vtt", VTT);
        touch(dir.path(), "c.VTT", VTT);
        touch(dir.path(), "d.srt", "");
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "e.vtt", VTT);

        let files = Workflow::discover(dir.path(), ".vtt").unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["a.vtt", "b.vtt"]);
    }

    #[tokio::test]
    async fn test_convert_nests_by_show() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Show.S01E01.WEBRip.Netflix.vtt", VTT);
        touch(dir.path(), "Other.Show.S02E10.vtt", VTT);

        let summary = workflow().convert_directory(dir.path(), None::<&Path>).await.unwrap();
        assert_eq!(summary, ConversionSummary { found: 2, converted: 2, skipped: 0, failed: 0 });

        let out = dir.path().join("out");
        let srt = std::fs::read_to_string(out.join("Show").join("Show.S01E01.WEBRip.Netflix.srt")).unwrap();
        assert_eq!(srt, "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n");
        assert!(out.join("Other.Show").join("Other.Show.S02E10.srt").is_file());
    }

    #[tokio::test]
    async fn test_convert_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Show.S01E01.vtt", VTT);
        let existing = dir.path().join("out").join("Show");
        std::fs::create_dir_all(&existing).unwrap();
        touch(&existing, "Show.S01E01.srt", "keep me");

        let summary = workflow().convert_directory(dir.path(), None::<&Path>).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.converted, 0);
        assert_eq!(std::fs::read_to_string(existing.join("Show.S01E01.srt")).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_convert_overwrite_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        touch(dir.path(), "Show.S01E01.vtt", VTT);
        touch(target.path(), "Show.S01E01.srt", "stale");

        let mut config = Config::default();
        config.convert.flat = true;
        config.convert.overwrite = true;
        let workflow = Workflow::new(config).unwrap();

        let summary = workflow.convert_directory(dir.path(), Some(target.path())).await.unwrap();
        assert_eq!(summary.converted, 1);
        let srt = std::fs::read_to_string(target.path().join("Show.S01E01.srt")).unwrap();
        assert!(srt.contains("Hello"));
    }

    #[tokio::test]
    async fn test_convert_continues_after_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Broken.S01E01.vtt", "not a subtitle");
        touch(dir.path(), "Show.S01E01.vtt", VTT);

        let summary = workflow().convert_directory(dir.path(), None::<&Path>).await.unwrap();
        assert_eq!(summary, ConversionSummary { found: 2, converted: 1, skipped: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_convert_survives_overflowing_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "A.S01E01.vtt",
            "WEBVTT\n\n99999999999999:00:00.000 --> 99999999999999:00:01.000\nHuge\n",
        );
        touch(dir.path(), "B.S01E01.vtt", VTT);

        let summary = workflow().convert_directory(dir.path(), None::<&Path>).await.unwrap();
        assert_eq!(summary, ConversionSummary { found: 2, converted: 1, skipped: 0, failed: 1 });
        assert!(dir.path().join("out").join("B").join("B.S01E01.srt").is_file());
        assert!(!dir.path().join("out").join("A").join("A.S01E01.srt").exists());
    }

    #[tokio::test]
    async fn test_convert_invalid_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = workflow().convert_directory(&missing, None::<&Path>).await.unwrap_err();
        assert!(matches!(err, EpisubError::InvalidInputDirectory(_)));
        assert!(!missing.join("out").exists());
    }

    #[test]
    fn test_check_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Show.S01E01.WEBRip.Netflix.vtt",
            "Show.S01E02.WEBRip.Netflix.vtt",
            "Show.S03E01.WEBRip.Netflix.vtt",
            "Show.S03E03.WEBRip.Netflix.vtt",
            "Show.S01E02.x264-OTHER.vtt",
            "Show.Trailer.vtt",
            "Show.S01E04.srt",
        ] {
            touch(dir.path(), name, VTT);
        }

        let lines: Vec<String> = workflow()
            .check_directory(dir.path())
            .unwrap()
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Show: expected season 2, got 3".to_string(),
                "Show (S3): expected episode 4, got 5".to_string(),
            ]
        );
    }

    #[test]
    fn test_check_clean_collection() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["A.S01E01.vtt", "A.S01E02.vtt", "A.S02E01.vtt", "B.S01E01.vtt"] {
            touch(dir.path(), name, "");
        }
        assert!(workflow().check_directory(dir.path()).unwrap().is_empty());
    }
}
