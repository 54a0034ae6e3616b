use crate::error::{AppError, Result};
use crate::fetch::MediaFetcher;
use crate::storage::{ObjectStorage, UploadOptions};
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use tracing::info;

/// Bucket holding the derived profile covers.
const THUMBNAIL_BUCKET: &str = "ig-covers";

/// Largest dimension of the stored thumbnail, in pixels.
const MAX_DIMENSION: u32 = 800;

const JPEG_QUALITY: u8 = 80;

/// Cache lifetime hint handed to storage, in seconds.
const CACHE_SECONDS: &str = "3600";

/// Build the media-resolution URL for a profile URL: the query string and any
/// trailing slash are stripped before the media path suffix is appended.
pub fn media_request_url(profile_url: &str) -> String {
    let base = profile_url.split('?').next().unwrap_or(profile_url);
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{}/media?size=l", base)
}

/// Decode an image, bound it to [`MAX_DIMENSION`] preserving aspect ratio and
/// re-encode it as JPEG.
pub fn recompress(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Transform(e.to_string()))?
        .decode()?;

    let resized = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;

    Ok(buffer)
}

/// Full thumbnail pipeline: derive the media URL, resolve the CDN location
/// through redirects, download, recompress and upload. Returns the generated
/// storage key.
///
/// Keys are derived from wall-clock millis and carry no uniqueness guarantee;
/// upsert semantics mean a same-millisecond collision is a silent overwrite.
pub async fn store_profile_thumbnail(
    fetcher: &dyn MediaFetcher,
    storage: &dyn ObjectStorage,
    profile_url: &str,
) -> Result<String> {
    let media_url = media_request_url(profile_url);
    let cdn_url = fetcher.resolve_final_url(&media_url).await?;

    let media = fetcher.download(&cdn_url).await?;
    let compressed = recompress(&media.bytes)?;

    let filename = format!("{}.jpg", Utc::now().timestamp_millis());
    let options = UploadOptions {
        cache_control: CACHE_SECONDS.to_string(),
        upsert: true,
        content_type: media
            .content_type
            .unwrap_or_else(|| "image/jpeg".to_string()),
    };
    storage
        .upload(THUMBNAIL_BUCKET, &filename, compressed, options)
        .await?;

    info!(filename, "stored thumbnail");
    Ok(filename)
}
