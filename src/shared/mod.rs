pub mod fuzzy;
pub mod time;

pub use time::*;
