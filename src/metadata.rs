//! Metadata lookup: URL validation and the `/info` projection.

use serde::Serialize;
use tracing::debug;

use crate::{
    common::GatewayError,
    sources::{MediaExtractor, MediaInfo, Thumbnail},
};

/// Index of the preferred thumbnail. Backends list thumbnails smallest
/// first, so this is usually a medium size.
const PREFERRED_THUMBNAIL: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoResponse {
    pub title: String,
    pub thumbnail: Option<String>,
}

/// Checks the `url` query parameter. A missing or empty parameter and one
/// the backend does not accept are reported differently.
pub fn validate_url<'a>(
    extractor: &dyn MediaExtractor,
    url: Option<&'a str>,
) -> Result<&'a str, GatewayError> {
    let url = url
        .filter(|u| !u.is_empty())
        .ok_or(GatewayError::InvalidInput("Invalid query"))?;
    if !extractor.validate_url(url) {
        debug!("rejected url {:?}", url);
        return Err(GatewayError::InvalidInput("Invalid url"));
    }
    Ok(url)
}

/// Third thumbnail when it has a URL, else the first.
pub fn pick_thumbnail(thumbnails: &[Thumbnail]) -> Option<&str> {
    let usable = |index: usize| {
        thumbnails
            .get(index)
            .map(|t| t.url.as_str())
            .filter(|url| !url.is_empty())
    };
    usable(PREFERRED_THUMBNAIL).or_else(|| usable(0))
}

pub async fn fetch_info(
    extractor: &dyn MediaExtractor,
    url: &str,
) -> Result<MediaInfo, GatewayError> {
    extractor.get_info(url).await.map_err(GatewayError::Backend)
}

/// Resolves `url` into the title and thumbnail shown by `/info`.
pub async fn get_info(
    extractor: &dyn MediaExtractor,
    url: &str,
) -> Result<InfoResponse, GatewayError> {
    let info = fetch_info(extractor, url).await?;
    Ok(InfoResponse {
        thumbnail: pick_thumbnail(&info.thumbnails).map(str::to_string),
        title: info.title,
    })
}
