use bustrack::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ShortcutDto {
    pub name: String,
    pub route: String,
    pub direction: String,
    pub destination: String,
    pub stop: String,
}

impl ShortcutDto {
    pub fn from(name: &str, shortcut: &Shortcut) -> Self {
        let (direction, destination) = shortcut
            .route
            .direction(shortcut.direction)
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            route: shortcut.route.short_name.clone(),
            direction: direction.to_string(),
            destination: destination.to_string(),
            stop: shortcut.stop_name.clone(),
        }
    }
}
