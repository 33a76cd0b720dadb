mod conversation;
mod settings;
mod shortcuts;

pub use conversation::*;
pub use settings::*;
pub use shortcuts::*;
