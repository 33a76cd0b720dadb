//! Voice-assistant engine for MBTA bus arrivals.
//!
//! A [`session::Session`] turns spoken requests ("when is the 39 inbound at
//! Forest Hills") into route, direction and stop identifiers over as many
//! conversational turns as it takes, then announces arrival countdowns or
//! keeps tracking the next few buses until the last of them has passed.
//! Speech, intent recognition and timers belong to the hosting voice
//! framework, reached through the [`host::Host`] trait.

pub mod announce;
pub mod config;
pub mod dialog;
pub mod gateway;
pub mod host;
pub mod intent;
pub mod resolver;
pub mod session;
pub mod shared;
pub mod shortcuts;
pub mod tracker;

pub mod prelude {
    pub use crate::announce::Arrival;
    pub use crate::config::{Config, PollFailurePolicy};
    pub use crate::dialog::Dialog;
    pub use crate::gateway::{Gateway, MbtaGateway, Prediction, RouteInfo, StopRecord};
    pub use crate::host::Host;
    pub use crate::intent::{Intent, Request, Slot, Slots};
    pub use crate::resolver::{Resolver, Selection};
    pub use crate::session::{Pending, Session};
    pub use crate::shortcuts::{Shortcut, ShortcutStore};
    pub use crate::tracker::{Poll, Start, Tracker, TrackerState};
}
