use crate::api::models::ScrapedMetadata;
use crate::browser::BrowserEngine;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

/// Category assigned when no extractor yields an identifier.
const DEFAULT_ITEM_TYPE: &str = "track";

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Failed to parse script selector"));

static ALBUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"album["\s]*[:=]["\s]*(\d+)"#).expect("Failed to compile album pattern")
});

static TRACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"track["\s]*[:=]["\s]*(\d+)"#).expect("Failed to compile track pattern")
});

/// Item data the page keeps in its well-known script global.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedItem {
    pub id: String,
    pub item_type: String,
}

/// Everything a browser session hands back from a loaded page.
#[derive(Debug, Clone)]
pub struct PageState {
    pub embedded_item: Option<EmbeddedItem>,
    pub html: String,
}

/// Extractor strategies are pure functions over the captured page state,
/// tried in order until one yields a result.
type Extractor = fn(&PageState) -> Option<ScrapedMetadata>;

const EXTRACTORS: &[Extractor] = &[embedded_item_extractor, script_pattern_extractor];

/// The structured script global wins outright when it carries an identifier.
fn embedded_item_extractor(state: &PageState) -> Option<ScrapedMetadata> {
    state
        .embedded_item
        .as_ref()
        .filter(|item| !item.id.is_empty())
        .map(|item| ScrapedMetadata {
            bandcamp_id: item.id.clone(),
            item_type: item.item_type.clone(),
        })
}

/// Fallback: scan inline script contents in document order for album/track id
/// patterns. The first script containing either pattern wins, with `album`
/// checked before `track` within a script.
fn script_pattern_extractor(state: &PageState) -> Option<ScrapedMetadata> {
    let document = Html::parse_document(&state.html);

    for script in document.select(&SCRIPT_SELECTOR) {
        let content = script.inner_html();

        if let Some(caps) = ALBUM_RE.captures(&content) {
            return Some(ScrapedMetadata {
                bandcamp_id: caps[1].to_string(),
                item_type: "album".to_string(),
            });
        }
        if let Some(caps) = TRACK_RE.captures(&content) {
            return Some(ScrapedMetadata {
                bandcamp_id: caps[1].to_string(),
                item_type: "track".to_string(),
            });
        }
    }

    None
}

/// Run the extractor strategies over the page state. When none yields an
/// identifier the result is an empty id with the default category.
pub fn extract_metadata(state: &PageState) -> ScrapedMetadata {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(state))
        .unwrap_or_else(|| ScrapedMetadata {
            bandcamp_id: String::new(),
            item_type: DEFAULT_ITEM_TYPE.to_string(),
        })
}

/// Scrape the page behind `url` in an isolated browser session. The session
/// is closed on every exit path before this returns.
pub async fn scrape_metadata(engine: &dyn BrowserEngine, url: &str) -> Result<ScrapedMetadata> {
    let mut session = engine.open().await?;
    let loaded = session.load_page_state(url).await;
    session.close().await;

    let state = loaded?;
    Ok(extract_metadata(&state))
}
