// Subtitle codecs
//
// Each supported format implements SubtitleCodec for both directions:
// - webvtt: WebVTT reader/writer (the usual download format)
// - srt: SubRip reader/writer (the usual conversion target)
//
// Files are read into a flat list of cues; styling, regions and cue settings
// are dropped on the way in.

pub mod srt;
pub mod webvtt;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{EpisubError, Result};

/// One timed subtitle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
}

impl SubtitleFormat {
    /// Format implied by a filename suffix such as `.vtt`
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "vtt" => Ok(SubtitleFormat::WebVtt),
            "srt" => Ok(SubtitleFormat::Srt),
            other => Err(EpisubError::UnsupportedFormat(format!(
                "no subtitle codec for extension '{}'",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::WebVtt => "vtt",
            SubtitleFormat::Srt => "srt",
        }
    }
}

/// Reader and writer for one subtitle format
pub trait SubtitleCodec: Send + Sync {
    /// Parse file content into cues, in file order
    fn parse(&self, content: &str) -> Result<Vec<Cue>>;

    /// Render cues as file content
    fn render(&self, cues: &[Cue]) -> String;
}

/// Factory for creating codec instances
pub struct SubtitleCodecFactory;

impl SubtitleCodecFactory {
    pub fn create(format: SubtitleFormat) -> Box<dyn SubtitleCodec> {
        match format {
            SubtitleFormat::WebVtt => Box::new(webvtt::WebVttCodec),
            SubtitleFormat::Srt => Box::new(srt::SrtCodec),
        }
    }
}

/// Read and parse a subtitle file
pub async fn load<P: AsRef<Path>>(path: P, format: SubtitleFormat) -> Result<Vec<Cue>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await?;
    let cues = SubtitleCodecFactory::create(format).parse(&content)?;
    info!("{} lines in {}", cues.len(), path.display());
    Ok(cues)
}

/// Render cues in `format` and write them to `output_path`
pub async fn save<P: AsRef<Path>>(cues: &[Cue], output_path: P, format: SubtitleFormat) -> Result<()> {
    let output_path = output_path.as_ref();
    debug!("Writing {} cues as {:?} to {}", cues.len(), format, output_path.display());

    let content = SubtitleCodecFactory::create(format).render(cues);
    fs::write(output_path, content).await?;

    info!("Saved {}", output_path.display());
    Ok(())
}

/// Remove every literal entity (e.g. `&lrm;`) from cue text
pub fn strip_entities(cues: &mut [Cue], entities: &[String]) {
    for cue in cues.iter_mut() {
        for entity in entities.iter().filter(|e| !e.is_empty()) {
            if cue.text.contains(entity.as_str()) {
                cue.text = cue.text.replace(entity.as_str(), "");
            }
        }
    }
}

/// Parse `[hh:]mm:ss<sep>fff` into a duration
pub(crate) fn parse_timestamp(value: &str, fraction_separator: char, line: usize) -> Result<Duration> {
    let malformed = || EpisubError::SubtitleParse {
        line,
        message: format!("malformed timestamp '{}'", value),
    };

    let (clock, fraction) = value.trim().split_once(fraction_separator).ok_or_else(malformed)?;
    if fraction.is_empty() || fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let fields: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(malformed()),
    };

    let number = |field: &str| -> Result<u64> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        field.parse::<u64>().map_err(|_| malformed())
    };

    let hours = number(hours)?;
    let minutes = number(minutes)?;
    let seconds = number(seconds)?;
    if minutes > 59 || seconds > 59 {
        return Err(malformed());
    }

    // "5" is half a second, not five milliseconds
    let millis = number(fraction)? * 10u64.pow(3 - fraction.len() as u32);

    let total = hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(malformed)?;

    Ok(Duration::from_millis(total))
}

/// Format a duration as `HH:MM:SS<sep>mmm`
pub(crate) fn format_timestamp(time: Duration, fraction_separator: char) -> String {
    let total_milliseconds = time.as_millis();
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, fraction_separator, millis)
}

/// Split content into blank-line separated blocks, keeping each block's
/// 1-based starting line number
pub(crate) fn blocks(content: &str) -> Vec<(usize, Vec<&str>)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 0;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push((start, std::mem::take(&mut current)));
            }
            continue;
        }
        if current.is_empty() {
            start = index + 1;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push((start, current));
    }

    blocks
}
