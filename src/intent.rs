use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vocabulary slots the host fills in from an utterance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    #[serde(rename = "T.Bus")]
    Bus,
    Arrivals,
    Tracking,
    Route,
    #[serde(rename = "Route.Name")]
    RouteName,
    Direction,
    Stop,
    Save,
    Remove,
    List,
    Shortcut,
    Shortcuts,
    SavedRouteNames,
    Shutdown,
}

pub type Slots = HashMap<Slot, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Arrivals,
    Tracking,
    SaveShortcut,
    RemoveShortcut,
    ListShortcuts,
    ShortcutArrivals,
    ShortcutTracking,
    Shutdown,
}

/// Which slots an intent needs and which it tolerates.
#[derive(Debug, Clone, Copy)]
pub struct IntentSignature {
    pub kind: IntentKind,
    pub required: &'static [Slot],
    pub optional: &'static [Slot],
}

impl IntentSignature {
    pub fn matches(&self, slots: &Slots) -> bool {
        self.required.iter().all(|slot| slots.contains_key(slot))
            && slots
                .keys()
                .all(|slot| self.required.contains(slot) || self.optional.contains(slot))
    }
}

const REQUEST_SLOTS: &[Slot] = &[Slot::Route, Slot::RouteName, Slot::Direction, Slot::Stop];

pub const INTENTS: &[IntentSignature] = &[
    IntentSignature {
        kind: IntentKind::Arrivals,
        required: &[Slot::Bus, Slot::Arrivals],
        optional: REQUEST_SLOTS,
    },
    IntentSignature {
        kind: IntentKind::Tracking,
        required: &[Slot::Bus, Slot::Tracking],
        optional: REQUEST_SLOTS,
    },
    IntentSignature {
        kind: IntentKind::SaveShortcut,
        required: &[Slot::Save, Slot::Bus, Slot::Shortcut],
        optional: &[],
    },
    IntentSignature {
        kind: IntentKind::RemoveShortcut,
        required: &[Slot::Remove, Slot::Bus, Slot::SavedRouteNames],
        optional: &[Slot::Shortcut],
    },
    IntentSignature {
        kind: IntentKind::ListShortcuts,
        required: &[Slot::List, Slot::Bus, Slot::Shortcuts],
        optional: &[],
    },
    IntentSignature {
        kind: IntentKind::ShortcutTracking,
        required: &[Slot::Bus, Slot::Tracking, Slot::SavedRouteNames],
        optional: &[Slot::Route],
    },
    IntentSignature {
        kind: IntentKind::ShortcutArrivals,
        required: &[Slot::Bus, Slot::Arrivals, Slot::SavedRouteNames],
        optional: &[Slot::Route],
    },
    IntentSignature {
        kind: IntentKind::Shutdown,
        required: &[Slot::Bus, Slot::Shutdown],
        optional: &[],
    },
];

/// Route, direction and stop as spoken, any of them possibly missing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub route: Option<String>,
    pub direction: Option<String>,
    pub stop: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Arrivals(Request),
    Tracking(Request),
    SaveShortcut,
    RemoveShortcut(String),
    ListShortcuts,
    ShortcutArrivals(String),
    ShortcutTracking(String),
    Shutdown,
}

impl Intent {
    /// First intent in [`INTENTS`] whose signature fits `slots`.
    pub fn recognize(slots: &Slots) -> Option<Self> {
        let signature = INTENTS.iter().find(|signature| signature.matches(slots))?;
        let text = |slot: Slot| slots.get(&slot).cloned();
        let intent = match signature.kind {
            IntentKind::Arrivals => Intent::Arrivals(Request::from_slots(slots)),
            IntentKind::Tracking => Intent::Tracking(Request::from_slots(slots)),
            IntentKind::SaveShortcut => Intent::SaveShortcut,
            IntentKind::RemoveShortcut => Intent::RemoveShortcut(text(Slot::SavedRouteNames)?),
            IntentKind::ListShortcuts => Intent::ListShortcuts,
            IntentKind::ShortcutArrivals => {
                Intent::ShortcutArrivals(text(Slot::SavedRouteNames)?)
            }
            IntentKind::ShortcutTracking => {
                Intent::ShortcutTracking(text(Slot::SavedRouteNames)?)
            }
            IntentKind::Shutdown => Intent::Shutdown,
        };
        Some(intent)
    }
}

impl Request {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    fn from_slots(slots: &Slots) -> Self {
        let text = |slot: Slot| {
            slots
                .get(&slot)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            route: text(Slot::RouteName),
            direction: text(Slot::Direction),
            stop: text(Slot::Stop),
        }
    }
}

#[cfg(test)]
fn slots(pairs: &[(Slot, &str)]) -> Slots {
    pairs
        .iter()
        .map(|(slot, value)| (*slot, value.to_string()))
        .collect()
}

#[test]
fn arrivals_with_route() {
    let intent = Intent::recognize(&slots(&[
        (Slot::Bus, "bus"),
        (Slot::Arrivals, "arrivals"),
        (Slot::RouteName, "39"),
    ]));
    assert_eq!(intent, Some(Intent::Arrivals(Request::new().route("39"))));
}

#[test]
fn saved_name_selects_shortcut_intent() {
    let intent = Intent::recognize(&slots(&[
        (Slot::Bus, "bus"),
        (Slot::Tracking, "track"),
        (Slot::SavedRouteNames, "work"),
    ]));
    assert_eq!(intent, Some(Intent::ShortcutTracking("work".into())));
}

#[test]
fn missing_required_slot() {
    let intent = Intent::recognize(&slots(&[(Slot::Save, "save"), (Slot::Bus, "bus")]));
    assert!(intent.is_none());
}

#[test]
fn unexpected_slot_is_rejected() {
    let intent = Intent::recognize(&slots(&[
        (Slot::Bus, "bus"),
        (Slot::Shutdown, "stop"),
        (Slot::Stop, "main street"),
    ]));
    assert!(intent.is_none());
}
