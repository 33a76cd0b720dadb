use serde::Serialize;
use std::fmt;

use crate::announce::Arrival;

/// Every line the assistant can say, with its template arguments.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "dialog", rename_all = "snake_case")]
pub enum Dialog {
    ServiceAnnouncement { route: String, dest: String },
    ArrivalPrefix { stop: String },
    Arrival(Arrival),
    NoBusesFound { stop: String },
    ErrorCallingServer,
    WhichRoute,
    WhichDirection {
        dir1: String,
        dest1: String,
        dir2: String,
        dest2: String,
    },
    /// Direction prompt for a route that runs one way only.
    ConfirmDirection { dir: String, dest: String },
    WhichStop,
    ShortcutPrompt,
    SaveComplete { shortcut: String },
    NotEnoughInfo,
    DeleteComplete { shortcut: String },
    ShortcutFileError,
    ListSaved { routes: String },
    NoSavedRoutes,
    ShutdownMessage,
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialog::ServiceAnnouncement { route, dest } => {
                write!(f, "Route {route} towards {dest}.")
            }
            Dialog::ArrivalPrefix { stop } => write!(f, "Buses are arriving at {stop} in"),
            Dialog::Arrival(arrival) => write!(f, "{arrival}"),
            Dialog::NoBusesFound { stop } => write!(f, "No buses were found for {stop}."),
            Dialog::ErrorCallingServer => {
                write!(f, "Sorry, I could not reach the transit server.")
            }
            Dialog::WhichRoute => write!(f, "Which route?"),
            Dialog::WhichDirection {
                dir1,
                dest1,
                dir2,
                dest2,
            } => write!(f, "{dir1} to {dest1}, or {dir2} to {dest2}?"),
            Dialog::ConfirmDirection { dir, dest } => write!(f, "{dir} to {dest}?"),
            Dialog::WhichStop => write!(f, "Which stop?"),
            Dialog::ShortcutPrompt => write!(f, "What would you like to call this shortcut?"),
            Dialog::SaveComplete { shortcut } => write!(f, "Saved as {shortcut}."),
            Dialog::NotEnoughInfo => write!(
                f,
                "I need a route, direction and stop before I can save a shortcut."
            ),
            Dialog::DeleteComplete { shortcut } => write!(f, "Removed {shortcut}."),
            Dialog::ShortcutFileError => {
                write!(f, "Sorry, I could not update your saved shortcuts.")
            }
            Dialog::ListSaved { routes } => write!(f, "Your shortcuts are {routes}."),
            Dialog::NoSavedRoutes => write!(f, "You have no saved shortcuts."),
            Dialog::ShutdownMessage => write!(f, "Bus tracking stopped."),
        }
    }
}

#[test]
fn renders_direction_choices() {
    let dialog = Dialog::WhichDirection {
        dir1: "Outbound".into(),
        dest1: "Nubian".into(),
        dir2: "Inbound".into(),
        dest2: "Harvard".into(),
    };
    assert_eq!(
        dialog.to_string(),
        "Outbound to Nubian, or Inbound to Harvard?"
    );
}

#[test]
fn renders_single_direction() {
    let dialog = Dialog::ConfirmDirection {
        dir: "Outbound".into(),
        dest: "Waltham".into(),
    };
    assert_eq!(dialog.to_string(), "Outbound to Waltham?");
}
