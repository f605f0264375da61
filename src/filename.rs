//! Episode identifiers parsed out of release filenames
//!
//! Release names look like `Show.Title.S02E05.WEBRip.Netflix.vtt`: a dotted
//! show title, a season/episode marker, then arbitrary release metadata.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Everything up to the last `.S<digits>E<digits>` marker is the show title
static SEASON_EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)\.S([0-9]+)E([0-9]+)").expect("Invalid season/episode pattern")
});

/// Position of one episode within a show, as named by its file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub show_title: String,
    pub season: u32,
    pub episode: u32,
}

/// Parse a base filename into an [`Identifier`].
///
/// Returns `None` when the name carries no season/episode marker, or when a
/// number does not fit in a `u32`. Callers skip such files without reporting.
///
/// ```
/// use episub::filename::parse;
///
/// let id = parse("Show.S02E05.WEBRip.Netflix.vtt").unwrap();
/// assert_eq!((id.show_title.as_str(), id.season, id.episode), ("Show", 2, 5));
/// assert!(parse("Show.Trailer.vtt").is_none());
/// ```
pub fn parse(filename: &str) -> Option<Identifier> {
    let captures = SEASON_EPISODE_PATTERN.captures(filename)?;

    let season = captures[2].parse().ok()?;
    let episode = captures[3].parse().ok()?;

    Some(Identifier {
        show_title: captures[1].to_string(),
        season,
        episode,
    })
}

/// Folder name a converted file is filed under.
///
/// Cuts the stem at the last `release_tag`, then at the last season/episode
/// marker, then drops trailing dots. Unlike [`parse`], a stem without a marker
/// still yields a folder, named after the stem itself.
pub fn show_folder(file_stem: &str, release_tag: &str) -> String {
    let mut folder = file_stem;

    if !release_tag.is_empty() {
        if let Some(index) = folder.rfind(release_tag) {
            folder = &folder[..index];
        }
    }

    if let Some(captures) = SEASON_EPISODE_PATTERN.captures(folder) {
        if let Some(title) = captures.get(1) {
            folder = title.as_str();
        }
    }

    folder.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(show: &str, season: u32, episode: u32) -> Identifier {
        Identifier {
            show_title: show.to_string(),
            season,
            episode,
        }
    }

    #[test]
    fn test_parse_release_name() {
        assert_eq!(parse("Show.S02E05.WEBRip.Netflix.vtt"), Some(id("Show", 2, 5)));
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse("The.Crown.S01E03.vtt"), Some(id("The.Crown", 1, 3)));
        assert_eq!(parse("Show.S0010E0007.en.vtt"), Some(id("Show", 10, 7)));
    }

    #[test]
    fn test_parse_uses_last_marker() {
        assert_eq!(
            parse("Show.S01E01.Recap.S03E12.x264-GRP.vtt"),
            Some(id("Show.S01E01.Recap", 3, 12))
        );
    }

    #[test]
    fn test_parse_keeps_release_tag_out_of_title() {
        let parsed = parse("Dark.S03E08.WEBRip.Netflix.vtt").unwrap();
        assert_eq!(parsed.show_title, "Dark");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(parse("Show.s01e02.vtt"), None);
        assert_eq!(parse("Show.S01e02.vtt"), None);
    }

    #[test]
    fn test_parse_no_marker() {
        assert_eq!(parse("Show.Trailer.vtt"), None);
        assert_eq!(parse("S01E02.vtt"), None);
        assert_eq!(parse("Show.SE.vtt"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_ignores_non_ascii_digit_marker() {
        assert_eq!(
            parse("Show.S01E02.x.S\u{0661}E\u{0662}.vtt"),
            Some(id("Show", 1, 2))
        );
        assert_eq!(parse("Show.S\u{0661}E\u{0662}.vtt"), None);
    }

    #[test]
    fn test_parse_number_overflow_is_no_match() {
        assert_eq!(parse("Show.S99999999999E01.vtt"), None);
    }

    #[test]
    fn test_show_folder_strips_tag_and_marker() {
        assert_eq!(show_folder("Show.S02E05.WEBRip.Netflix", ".WEBRip.Netflix"), "Show");
        assert_eq!(show_folder("The.Crown.S01E03", ".WEBRip.Netflix"), "The.Crown");
    }

    #[test]
    fn test_show_folder_without_marker() {
        assert_eq!(show_folder("Movie.WEBRip.Netflix", ".WEBRip.Netflix"), "Movie");
        assert_eq!(show_folder("Movie...", ".WEBRip.Netflix"), "Movie");
        assert_eq!(show_folder("Movie", ""), "Movie");
    }

    #[test]
    fn test_show_folder_disagrees_with_parse_title() {
        // Trailing dots survive in the parsed title but not in the folder
        let stem = "Show..S01E01";
        assert_eq!(parse(stem).unwrap().show_title, "Show.");
        assert_eq!(show_folder(stem, ".WEBRip.Netflix"), "Show");
    }
}
