pub mod engine;
pub mod models;

pub use engine::{AddError, CartEngine, CheckoutError, QueryError, RemoveError};
pub use models::{Cart, CartItem, CartTotalError};
