use std::sync::Arc;

use crate::auth::TokenManager;
use crate::geo::DistanceLookup;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub distance: Arc<dyn DistanceLookup>,
    pub tokens: TokenManager,
    pub metrics: Metrics,
    pub empty_query_is_error: bool,
}

impl AppState {
    pub fn new(
        distance: Arc<dyn DistanceLookup>,
        tokens: TokenManager,
        empty_query_is_error: bool,
    ) -> Self {
        Self {
            store: Store::new(),
            distance,
            tokens,
            metrics: Metrics::new(),
            empty_query_is_error,
        }
    }
}
