use axum::{
    Router,
    extract::{Json, Query, State},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::AppState;
use crate::api::models::{ScrapedMetadata, ThumbnailResponse, UrlQuery};
use crate::error::{AppError, Result};
use crate::scrape::scrape_metadata;
use crate::thumbnail::store_profile_thumbnail;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/ig-thumbnail", get(ig_thumbnail_handler))
        .route("/api/bandcamp-oembed", get(bandcamp_oembed_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn ig_thumbnail_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<ThumbnailResponse>> {
    let url = query
        .url
        .filter(|url| !url.is_empty())
        .ok_or(AppError::InvalidRequest("Missing url parameter"))?;

    info!(%url, "thumbnail request");
    let filename =
        store_profile_thumbnail(state.fetcher.as_ref(), state.storage.as_ref(), &url).await?;

    Ok(Json(ThumbnailResponse {
        image_url: filename,
    }))
}

async fn bandcamp_oembed_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<ScrapedMetadata>> {
    let url = query
        .url
        .filter(|url| !url.is_empty())
        .ok_or(AppError::InvalidRequest("Missing url"))?;

    info!(%url, "oembed scrape request");
    match scrape_metadata(state.browser.as_ref(), &url).await {
        Ok(metadata) => Ok(Json(metadata)),
        Err(err) => {
            error!(%url, "scraping error: {err}");
            Err(AppError::ExtractionFailed)
        }
    }
}
