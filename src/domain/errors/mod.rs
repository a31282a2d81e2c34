//! Domain error types.

mod icon_error;

pub use icon_error::{IconError, IconResult};
