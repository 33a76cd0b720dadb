use std::time::Duration;

use crate::dialog::Dialog;

/// Vocabulary kind under which shortcut names are registered.
pub const SHORTCUT_VOCABULARY: &str = "SavedRouteNames";

/// Name of the repeating tracking poll.
pub const TRACKING_EVENT: &str = "BusTracker";

/// Capabilities the voice framework hosting the assistant provides.
///
/// Recognizing utterances, synthesizing speech and running timers all live on
/// the host side. A repeating event scheduled here is expected to call
/// [`crate::session::Session::tracking_tick`] every `interval`, never
/// overlapping two ticks.
pub trait Host {
    fn speak(&mut self, dialog: Dialog);

    /// Blocks until the line being spoken has finished.
    fn wait_while_speaking(&mut self) {}

    fn schedule_repeating(&mut self, name: &str, interval: Duration);

    /// Cancelling an event that is not scheduled does nothing.
    fn cancel_scheduled(&mut self, name: &str);

    fn register_vocabulary(&mut self, term: &str, kind: &str);
}
