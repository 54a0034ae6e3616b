use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

/// The value is the generated storage key, not a resolvable URL; the
/// consuming client builds the public URL itself. Field name kept as-is.
#[derive(Serialize)]
pub struct ThumbnailResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedMetadata {
    pub bandcamp_id: String,
    pub item_type: String,
}
