//! Mirror selection for Piped and Invidious style APIs.

pub mod models;
pub mod ops;
pub mod pool;
pub mod resolve;

pub use models::StreamInfo;
pub use pool::CandidatePool;
pub use resolve::Resolver;
