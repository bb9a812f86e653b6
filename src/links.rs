use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Drop every url that exactly matches a denylist entry, keeping order.
pub fn filter_denied(urls: Vec<String>, denylist: &[&str]) -> Vec<String> {
    let before = urls.len();
    let kept: Vec<String> = urls
        .into_iter()
        .filter(|url| !denylist.contains(&url.as_str()))
        .collect();
    info!("Urls after denylist: {} (dropped {})", kept.len(), before - kept.len());
    kept
}

/// Write the url list, `" \n"` separated, replacing any previous file.
pub fn save_list(urls: &[String], path: &Path) -> Result<()> {
    std::fs::write(path, urls.join(" \n"))
        .with_context(|| format!("Failed to write url list {:?}", path))?;
    info!("Saved {} urls to {:?}", urls.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DENYLIST;

    fn owned(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn denied_urls_removed_wherever_they_sit() {
        let urls = owned(&[
            DENYLIST[2],
            "https://www.legislature.ms.gov/legislators/senators/a.xml",
            DENYLIST[0],
            "https://www.legislature.ms.gov/legislators/representatives/b.xml",
            DENYLIST[1],
        ]);
        let kept = filter_denied(urls, &DENYLIST);
        assert_eq!(
            kept,
            owned(&[
                "https://www.legislature.ms.gov/legislators/senators/a.xml",
                "https://www.legislature.ms.gov/legislators/representatives/b.xml",
            ])
        );
    }

    #[test]
    fn match_is_exact_not_prefix() {
        // Denylist holds the index page, not the member pages under it
        let urls = owned(&[
            "https://www.legislature.ms.gov/legislators/senators/a.xml",
            "https://www.legislature.ms.gov/legislators/senators",
        ]);
        assert_eq!(filter_denied(urls.clone(), &DENYLIST), urls);
    }

    #[test]
    fn list_file_is_space_newline_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        std::fs::write(&path, "stale").unwrap();

        save_list(&owned(&["https://a.example/", "https://b.example/"]), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "https://a.example/ \nhttps://b.example/");
    }
}
