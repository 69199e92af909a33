//! Flat-file cache of extracted page text.
//!
//! One `.md` file per source, named after the source URL. The cache is
//! rewritten on every fetch and read back wholesale by [`load_articles`],
//! which picks up every `.md` file in the directory regardless of which run
//! wrote it.

use crate::models::ArticleMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Extension of cache files, without the dot.
pub const CACHE_EXTENSION: &str = "md";

/// Cache filename for a source URL.
///
/// Drops everything up to the last `//`, a leading `www.`, turns `/` into
/// `_` and appends `.md`. Distinct URLs can map to the same name; the later
/// write wins.
///
/// ```ignore
/// assert_eq!(document_filename("https://www.spiegel.de"), "spiegel.de.md");
/// assert_eq!(document_filename("https://www.dw.com/en/top-stories"), "dw.com_en_top-stories.md");
/// ```
pub fn document_filename(url: &str) -> String {
    format!("{}.{}", document_key(url), CACHE_EXTENSION)
}

/// Document key for a source URL: its cache filename without the extension.
pub fn document_key(url: &str) -> String {
    let rest = url.rsplit("//").next().unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.replace('/', "_")
}

/// Write `content` to the cache file for `url`, replacing any previous file.
#[instrument(level = "debug", skip(content), fields(bytes = content.len()))]
pub async fn write_document(
    dir: &Path,
    url: &str,
    content: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(document_filename(url));
    fs::write(&path, content).await?;
    debug!(path = %path.display(), "Wrote cached document");
    Ok(path)
}

/// Load every `.md` file in `dir` into an [`ArticleMap`] keyed by file stem.
///
/// Subdirectories are ignored and symlinks are followed. Invalid UTF-8 is
/// replaced rather than rejected.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn load_articles(dir: &Path) -> Result<ArticleMap, Box<dyn Error>> {
    let mut articles = ArticleMap::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !fs::metadata(&path).await?.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "Skipping cache file with non UTF-8 name");
            continue;
        };

        let bytes = fs::read(&path).await?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), "Cache file is not valid UTF-8; decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        debug!(%key, bytes = content.len(), "Loaded cached document");
        articles.insert(key.to_string(), content);
    }

    info!(count = articles.len(), "Loaded cached documents");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_filename_known_hosts() {
        assert_eq!(document_filename("https://www.spiegel.de"), "spiegel.de.md");
        assert_eq!(document_filename("https://n-tv.de"), "n-tv.de.md");
        assert_eq!(document_filename("https://www.n-tv.de"), "n-tv.de.md");
    }

    #[test]
    fn test_document_filename_is_deterministic() {
        let url = "https://www.theguardian.com/international";
        let first = document_filename(url);
        assert_eq!(first, document_filename(url));
        assert_eq!(first, "theguardian.com_international.md");
    }

    #[test]
    fn test_document_filename_paths_and_schemes() {
        assert_eq!(
            document_filename("https://www.dw.com/en/top-stories/s-9097"),
            "dw.com_en_top-stories_s-9097.md"
        );
        assert_eq!(document_filename("http://www.ft.com/"), "ft.com_.md");
        assert_eq!(document_filename("heise.de"), "heise.de.md");
    }

    #[test]
    fn test_document_filename_only_strips_leading_www() {
        assert_eq!(document_filename("https://news.www.example.com"), "news.www.example.com.md");
    }

    #[test]
    fn test_document_filename_collides_across_schemes() {
        assert_eq!(
            document_filename("http://www.spiegel.de"),
            document_filename("https://spiegel.de")
        );
    }

    #[tokio::test]
    async fn test_write_document_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let url = "https://www.faz.net";

        write_document(tmp.path(), url, "first run").await.unwrap();
        let path = write_document(tmp.path(), url, "second").await.unwrap();

        assert_eq!(path, tmp.path().join("faz.net.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
    }

    #[tokio::test]
    async fn test_load_articles_one_entry_per_md_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("spiegel.de.md"), "Spiegel text").unwrap();
        std::fs::write(tmp.path().join("dw.com.md"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(tmp.path().join("nested.md")).unwrap();

        let articles = load_articles(tmp.path()).await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles["spiegel.de"], "Spiegel text");
        assert_eq!(articles["dw.com"], "");
        assert!(!articles.contains_key("notes"));
        assert!(!articles.contains_key("nested"));
    }

    #[tokio::test]
    async fn test_load_articles_includes_files_from_earlier_runs() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("old-source.de.md"), "stale").unwrap();
        write_document(tmp.path(), "https://www.welt.de", "fresh").await.unwrap();

        let articles = load_articles(tmp.path()).await.unwrap();

        let keys: Vec<&str> = articles.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["old-source.de", "welt.de"]);
    }

    #[tokio::test]
    async fn test_load_articles_lossy_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bild.de.md"), [b'o', b'k', 0xff]).unwrap();

        let articles = load_articles(tmp.path()).await.unwrap();

        assert_eq!(articles["bild.de"], "ok\u{fffd}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_articles_follows_symlinked_files() {
        let tmp = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        let target = shared.path().join("heise.de.md");
        std::fs::write(&target, "linked page").unwrap();
        std::os::unix::fs::symlink(&target, tmp.path().join("heise.de.md")).unwrap();
        std::os::unix::fs::symlink(shared.path(), tmp.path().join("nested.md")).unwrap();

        let articles = load_articles(tmp.path()).await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles["heise.de"], "linked page");
    }

    #[tokio::test]
    async fn test_load_articles_missing_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_articles(&tmp.path().join("missing")).await.is_err());
    }
}
