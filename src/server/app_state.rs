use std::sync::Arc;

use crate::{configs::Config, sources::MediaExtractor};

/// Top-level application state.
pub struct AppState {
    pub config: Config,
    /// The one extraction backend every route resolves through.
    pub extractor: Arc<dyn MediaExtractor>,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<dyn MediaExtractor>) -> Arc<Self> {
        Arc::new(Self { config, extractor })
    }
}
