//! Port definitions.

mod fetch_port;

pub use fetch_port::{FetchFailure, IconFetcher};
