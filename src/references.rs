use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use lopdf::{Document, Object};
use regex::Regex;
use tracing::{debug, info};

static TEXT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]{}]+"#).unwrap());

/// Open the roster PDF and return its url references, first-seen order, no duplicates.
pub fn extract_urls(path: &Path) -> Result<Vec<String>> {
    let doc = Document::load(path).with_context(|| format!("Failed to open PDF {:?}", path))?;
    let urls = collect_urls(&doc);
    if urls.is_empty() {
        anyhow::bail!("No url references found in {:?}", path);
    }
    info!("Url references in PDF: {}", urls.len());
    Ok(urls)
}

fn collect_urls(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let candidates = annotation_uris(doc).into_iter().chain(text_urls(doc));
    for url in candidates {
        if !is_page_url(&url) || seen.contains(&url) {
            continue;
        }
        seen.insert(url.clone());
        urls.push(url);
    }
    urls
}

/// URIs carried by link annotations, page by page.
fn annotation_uris(doc: &Document) -> Vec<String> {
    let mut uris = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Ok(annots) = page.get(b"Annots") else {
            continue;
        };
        let Ok((_, annots)) = doc.dereference(annots) else {
            continue;
        };
        let Ok(annots) = annots.as_array() else {
            continue;
        };
        uris.extend(annots.iter().filter_map(|a| link_uri(doc, a)));
    }
    uris
}

fn link_uri(doc: &Document, annot: &Object) -> Option<String> {
    let (_, annot) = doc.dereference(annot).ok()?;
    let (_, action) = doc.dereference(annot.as_dict().ok()?.get(b"A").ok()?).ok()?;
    let (_, uri) = doc.dereference(action.as_dict().ok()?.get(b"URI").ok()?).ok()?;
    let uri = String::from_utf8_lossy(uri.as_str().ok()?).trim().to_string();
    (!uri.is_empty()).then_some(uri)
}

/// Plain-text urls; pages whose text can't be decoded are skipped.
fn text_urls(doc: &Document) -> Vec<String> {
    let mut urls = Vec::new();
    for page_num in doc.get_pages().into_keys() {
        match doc.extract_text(&[page_num]) {
            Ok(text) => urls.extend(find_text_urls(&text)),
            Err(e) => debug!("No text from page {}: {}", page_num, e),
        }
    }
    urls
}

fn find_text_urls(text: &str) -> Vec<String> {
    TEXT_URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']).to_string())
        .collect()
}

/// http(s) links that aren't themselves PDF documents.
fn is_page_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    !path.ends_with(".pdf")
}
