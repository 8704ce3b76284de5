mod app_state;
mod cache;
mod errors;

pub use app_state::AppState;
pub use cache::CachedValue;
pub use errors::*;
