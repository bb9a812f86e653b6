use std::path::PathBuf;
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Pages linked from the roster PDF that are not member bio pages.
pub const DENYLIST: [&str; 3] = [
    "https://ltgovhosemann.ms.gov/",
    "https://www.legislature.ms.gov/legislators/senators/",
    "https://www.legislature.ms.gov/legislators/representatives/",
];

pub const LINKS_FILE: &str = "links.txt";

pub const MIN_DELAY_SECS: u64 = 3;
pub const MAX_DELAY_SECS: u64 = 14;

/// Everything one run needs, resolved from the command line up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub save_list: bool,
    pub links_path: PathBuf,
    pub delimiter: u8,
    pub delay: DelayBounds,
    pub show_progress: bool,
}

/// Inclusive bounds of the pause taken after every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayBounds {
    pub min: Duration,
    pub max: Duration,
}

impl DelayBounds {
    pub fn from_secs(min: u64, max: u64) -> anyhow::Result<Self> {
        if min > max {
            anyhow::bail!("min delay ({min}s) is greater than max delay ({max}s)");
        }
        Ok(DelayBounds {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        })
    }
}

impl Default for DelayBounds {
    fn default() -> Self {
        DelayBounds {
            min: Duration::from_secs(MIN_DELAY_SECS),
            max: Duration::from_secs(MAX_DELAY_SECS),
        }
    }
}

/// Join path segments the way a shell user would type them apart.
pub fn join_segments(segments: &[String]) -> PathBuf {
    segments.iter().collect()
}

pub fn delimiter_byte(c: char) -> anyhow::Result<u8> {
    if !c.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character, got {c:?}");
    }
    Ok(c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_join_into_one_path() {
        let p = join_segments(&["data".into(), "out".into(), "bios.csv".into()]);
        assert_eq!(p, PathBuf::from("data").join("out").join("bios.csv"));
    }

    #[test]
    fn inverted_delay_bounds_rejected() {
        assert!(DelayBounds::from_secs(10, 2).is_err());
        let b = DelayBounds::from_secs(3, 3).unwrap();
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('§').is_err());
    }
}
