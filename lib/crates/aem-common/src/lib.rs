pub mod tags;
pub mod types;

pub use tags::{tag_names, tag_pair};
pub use types::*;
