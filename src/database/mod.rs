mod request_error;
pub mod requests;
mod score;
mod store;

pub use request_error::*;
pub use score::StoredScore;
pub use store::ScoreStore;

pub type DatabasePool = sqlx::AnyPool;
