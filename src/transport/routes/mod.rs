pub mod download;
pub mod info;
pub mod ping;

use axum::extract::{Query, rejection::QueryRejection};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

/// `url` from the query string. A query string that does not parse counts
/// as missing.
pub fn requested_url(query: Result<Query<UrlQuery>, QueryRejection>) -> Option<String> {
    query.ok().and_then(|Query(q)| q.url)
}
