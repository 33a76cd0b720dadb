mod shortcut;
mod speech;

pub use shortcut::*;
pub use speech::*;
