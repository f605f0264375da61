use super::{Cue, SubtitleCodec, blocks, format_timestamp, parse_timestamp};
use crate::error::{EpisubError, Result};

pub struct SrtCodec;

impl SubtitleCodec for SrtCodec {
    fn parse(&self, content: &str) -> Result<Vec<Cue>> {
        let mut cues = Vec::new();

        for (line, lines) in blocks(content) {
            // Sequence numbers are optional on read and regenerated on write
            let timing_index = match lines.iter().take(2).position(|l| l.contains("-->")) {
                Some(index) => index,
                None => {
                    return Err(EpisubError::SubtitleParse {
                        line,
                        message: "missing cue timing".to_string(),
                    });
                }
            };

            let timing_line = line + timing_index;
            let (start, end) = lines[timing_index]
                .split_once("-->")
                .map(|(start, end)| (start.trim(), end.trim()))
                .unwrap_or_default();

            cues.push(Cue {
                start: parse_timestamp(start, ',', timing_line)?,
                end: parse_timestamp(end, ',', timing_line)?,
                text: lines[timing_index + 1..].join("\n"),
            });
        }

        Ok(cues)
    }

    fn render(&self, cues: &[Cue]) -> String {
        let mut srt_content = String::new();

        for (index, cue) in cues.iter().enumerate() {
            srt_content.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                index + 1,
                format_timestamp(cue.start, ','),
                format_timestamp(cue.end, ','),
                cue.text.trim()
            ));
        }

        srt_content
    }
}
