//! Domain entity definitions.

mod icon;

pub use icon::{IconImage, IconKey};
