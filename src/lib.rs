pub mod config;
pub mod enrich;
pub mod fetch;
pub mod pipeline;
pub mod store;
pub mod types;

pub use config::Config;
pub use types::{MimeEntry, MimeRecord};
