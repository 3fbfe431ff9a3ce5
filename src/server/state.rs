use crate::predictor::Predictor;

/// Shared, read-only application state. The predictor never mutates after
/// startup, so handlers borrow it without locking.
pub struct AppState {
    pub predictor: Predictor,
}
