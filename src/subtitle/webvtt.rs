use tracing::debug;

use super::{Cue, SubtitleCodec, blocks, format_timestamp, parse_timestamp};
use crate::error::{EpisubError, Result};

const TIMING_ARROW: &str = "-->";

pub struct WebVttCodec;

impl SubtitleCodec for WebVttCodec {
    fn parse(&self, content: &str) -> Result<Vec<Cue>> {
        let mut blocks = blocks(content).into_iter();

        match blocks.next() {
            Some((_, lines)) if is_header(lines[0]) => {}
            Some((line, _)) => {
                return Err(EpisubError::SubtitleParse {
                    line,
                    message: "missing WEBVTT header".to_string(),
                });
            }
            None => {
                return Err(EpisubError::SubtitleParse {
                    line: 1,
                    message: "empty file".to_string(),
                });
            }
        }

        let mut cues = Vec::new();
        for (line, lines) in blocks {
            if is_metadata_block(lines[0]) {
                continue;
            }

            // An optional identifier line may precede the timing line
            let Some(timing_index) = lines.iter().take(2).position(|l| l.contains(TIMING_ARROW)) else {
                debug!("Skipping block without cue timing at line {}", line);
                continue;
            };

            let timing_line = line + timing_index;
            let (start, end) = parse_timing(lines[timing_index], timing_line)?;

            cues.push(Cue {
                start,
                end,
                text: lines[timing_index + 1..].join("\n"),
            });
        }

        Ok(cues)
    }

    fn render(&self, cues: &[Cue]) -> String {
        let mut content = String::from("WEBVTT\n\n");

        for cue in cues {
            content.push_str(&format!(
                "{} --> {}\n{}\n\n",
                format_timestamp(cue.start, '.'),
                format_timestamp(cue.end, '.'),
                cue.text.trim()
            ));
        }

        content
    }
}

fn is_header(line: &str) -> bool {
    match line.strip_prefix("WEBVTT") {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

fn is_metadata_block(line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"].iter().any(|keyword| match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    })
}

/// Parse `start --> end [settings]`; cue settings are dropped
fn parse_timing(line: &str, line_number: usize) -> Result<(std::time::Duration, std::time::Duration)> {
    let (start, rest) = line.split_once(TIMING_ARROW).ok_or_else(|| EpisubError::SubtitleParse {
        line: line_number,
        message: format!("malformed cue timing '{}'", line),
    })?;
    let end = rest.split_whitespace().next().unwrap_or_default();

    Ok((
        parse_timestamp(start, '.', line_number)?,
        parse_timestamp(end, '.', line_number)?,
    ))
}
