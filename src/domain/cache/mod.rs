//! Cache domain - exact-match baseline

mod key;
mod repository;

pub use key::ExactMatchKey;
pub use repository::ResponseCache;
