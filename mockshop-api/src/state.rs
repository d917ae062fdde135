use mockshop_cart::CartEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CartEngine>,
}

impl AppState {
    pub fn new(engine: CartEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
