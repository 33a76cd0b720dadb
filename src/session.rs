use chrono::NaiveDateTime;
use std::ops::ControlFlow;
use tracing::{debug, error, info};

use crate::{
    announce,
    config::Config,
    dialog::Dialog,
    gateway::Gateway,
    host::{Host, SHORTCUT_VOCABULARY, TRACKING_EVENT},
    intent::{Intent, Request},
    resolver::{Resolver, Selection},
    shared::time::service_now,
    shortcuts::{self, ShortcutStore},
    tracker::{Poll, Start, Tracker},
};

/// The field the next free-text utterance is expected to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Route,
    Direction,
    Stop,
    ShortcutName,
}

/// One conversation with the assistant.
///
/// Holds the selection being resolved, the tracker and the shortcut store.
/// A new arrivals or tracking request starts over with an empty selection and
/// cancels any tracking in progress. Failures never leave this type; they
/// are spoken through the [`Host`].
pub struct Session<G: Gateway> {
    gateway: G,
    config: Config,
    resolver: Resolver,
    selection: Selection,
    tracker: Tracker,
    pending: Option<Pending>,
    tracking_requested: bool,
    shortcuts: ShortcutStore,
    clock: fn() -> NaiveDateTime,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G, config: Config, shortcuts: ShortcutStore) -> Self {
        let config = config.normalized();
        Self {
            gateway,
            resolver: Resolver::new().with_min_confidence(config.min_confidence),
            tracker: Tracker::new(config.max_tracked).with_poll_failure(config.poll_failure),
            config,
            selection: Selection::new(),
            pending: None,
            tracking_requested: false,
            shortcuts,
            clock: service_now,
        }
    }

    /// Replaces the service-region clock used to turn timestamps into waits.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn shortcuts(&self) -> &ShortcutStore {
        &self.shortcuts
    }

    /// Teaches the host the names of every saved shortcut.
    pub fn register_vocabulary<H: Host>(&self, host: &mut H) {
        for name in self.shortcuts.list() {
            host.register_vocabulary(name, SHORTCUT_VOCABULARY);
        }
    }

    pub fn update_settings(&mut self, config: Config) {
        let config = config.normalized();
        info!(
            "Settings changed: api key {}, tracking {} buses every {}s",
            if config.api_key.is_some() { "set" } else { "unset" },
            config.max_tracked,
            config.tracking_interval_secs
        );
        self.gateway.set_api_key(config.api_key.clone());
        if config.base_url != self.config.base_url {
            info!("Agency moved to {}, route table will be reloaded", config.base_url);
            self.gateway.set_base_url(&config.base_url);
            self.resolver.invalidate_routes();
        }
        self.tracker.configure(config.max_tracked, config.poll_failure);
        self.resolver.set_min_confidence(config.min_confidence);
        self.config = config;
    }

    pub fn handle<H: Host>(&mut self, host: &mut H, intent: Intent) {
        debug!("Handling {intent:?}");
        match intent {
            Intent::Arrivals(request) => self.request(host, request, false),
            Intent::Tracking(request) => self.request(host, request, true),
            Intent::SaveShortcut => self.save_shortcut(host),
            Intent::RemoveShortcut(name) => self.remove_shortcut(host, &name),
            Intent::ListShortcuts => self.list_shortcuts(host),
            Intent::ShortcutArrivals(name) => self.shortcut_request(host, &name, false),
            Intent::ShortcutTracking(name) => self.shortcut_request(host, &name, true),
            Intent::Shutdown => self.shutdown(host),
        }
    }

    /// Starts a new arrivals (`tracking == false`) or tracking request from
    /// whatever the utterance carried.
    pub fn request<H: Host>(&mut self, host: &mut H, request: Request, tracking: bool) {
        self.pending = None;
        self.end_tracking(host);
        self.selection = Selection::new();
        self.tracking_requested = tracking;

        if let Some(route) = request.route.as_deref()
            && self.fill_route(host, route).is_break()
        {
            return;
        }
        if let Some(direction) = request.direction.as_deref()
            && self.selection.route.is_some()
        {
            self.fill_direction(direction);
        }
        if let Some(stop) = request.stop.as_deref()
            && self.selection.direction.is_some()
            && self.fill_stop(host, stop).is_break()
        {
            return;
        }
        self.advance(host);
    }

    /// Consumes a follow-up utterance for the pending question. Returns false
    /// when nothing was asked.
    pub fn reply<H: Host>(&mut self, host: &mut H, utterance: &str) -> bool {
        let Some(pending) = self.pending.take() else {
            debug!("Ignoring {utterance:?}, nothing was asked");
            return false;
        };
        let flow = match pending {
            Pending::Route => self.fill_route(host, utterance),
            Pending::Direction => {
                self.fill_direction(utterance);
                ControlFlow::Continue(())
            }
            Pending::Stop => self.fill_stop(host, utterance),
            Pending::ShortcutName => {
                self.finish_save(host, utterance);
                return true;
            }
        };
        if flow.is_continue() {
            self.advance(host);
        }
        true
    }

    /// Tracking tick, called by the host's repeating event.
    pub fn tracking_tick<H: Host>(&mut self, host: &mut H) {
        let Some(target) = self.selection.target() else {
            self.end_tracking(host);
            return;
        };
        match self.tracker.poll(&self.gateway, target) {
            Poll::Due(times) => {
                let stop = self.selection.stop_name().unwrap_or_default();
                announce::announce(host, stop, &times, (self.clock)());
            }
            Poll::Skipped => {}
            Poll::Finished => host.cancel_scheduled(TRACKING_EVENT),
        }
    }

    pub fn save_shortcut<H: Host>(&mut self, host: &mut H) {
        if self.selection.is_complete() {
            self.pending = Some(Pending::ShortcutName);
            host.speak(Dialog::ShortcutPrompt);
        } else {
            host.speak(Dialog::NotEnoughInfo);
        }
    }

    pub fn remove_shortcut<H: Host>(&mut self, host: &mut H, name: &str) {
        match self.shortcuts.remove(name) {
            Ok(removed) => {
                debug!("Shortcut {name:?} removed: {removed}");
                host.speak(Dialog::DeleteComplete {
                    shortcut: name.to_string(),
                });
            }
            Err(err) => {
                error!("Failed to remove shortcut {name:?}: {err}");
                host.speak(Dialog::ShortcutFileError);
            }
        }
    }

    pub fn list_shortcuts<H: Host>(&mut self, host: &mut H) {
        let names = self.shortcuts.list();
        if names.is_empty() {
            host.speak(Dialog::NoSavedRoutes);
        } else {
            host.speak(Dialog::ListSaved {
                routes: names.join(", "),
            });
        }
    }

    /// Arrivals or tracking for a saved shortcut. A name the host still
    /// recognizes but that has since been removed is ignored.
    pub fn shortcut_request<H: Host>(&mut self, host: &mut H, name: &str, tracking: bool) {
        let Some(selection) = self.shortcuts.restore(name) else {
            debug!("No shortcut named {name:?}");
            return;
        };
        self.pending = None;
        self.end_tracking(host);
        self.selection = selection;
        self.tracking_requested = tracking;
        self.dispatch(host);
    }

    pub fn shutdown<H: Host>(&mut self, host: &mut H) {
        self.end_tracking(host);
        self.pending = None;
        host.speak(Dialog::ShutdownMessage);
    }

    fn end_tracking<H: Host>(&mut self, host: &mut H) {
        host.cancel_scheduled(TRACKING_EVENT);
        self.tracker.stop();
    }

    /// Breaks when the agency could not be reached; the error has been spoken
    /// and the request is abandoned.
    fn fill_route<H: Host>(&mut self, host: &mut H, raw: &str) -> ControlFlow<()> {
        match self.resolver.resolve_route(&self.gateway, raw) {
            Ok(Some(route)) => {
                self.selection.set_route(route);
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(err) => {
                error!("Failed to load routes: {err}");
                host.speak(Dialog::ErrorCallingServer);
                ControlFlow::Break(())
            }
        }
    }

    fn fill_direction(&mut self, raw: &str) {
        let Some(route) = &self.selection.route else {
            return;
        };
        if let Some(direction) = self.resolver.resolve_direction(raw, route) {
            self.selection.set_direction(direction.index);
        }
    }

    fn fill_stop<H: Host>(&mut self, host: &mut H, raw: &str) -> ControlFlow<()> {
        let (Some(route), Some(direction)) = (&self.selection.route, self.selection.direction)
        else {
            return ControlFlow::Continue(());
        };
        match self.resolver.resolve_stop(&self.gateway, raw, route, direction) {
            Ok(Some(stop)) => {
                self.selection.set_stop(stop.id, stop.name);
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(err) => {
                error!("Failed to load stops: {err}");
                host.speak(Dialog::ErrorCallingServer);
                ControlFlow::Break(())
            }
        }
    }

    /// Asks for the first missing field, or answers once nothing is missing.
    fn advance<H: Host>(&mut self, host: &mut H) {
        if self.selection.is_complete() {
            self.dispatch(host);
        } else if self.selection.direction.is_some() {
            self.pending = Some(Pending::Stop);
            host.speak(Dialog::WhichStop);
        } else if let Some(route) = &self.selection.route {
            let prompt = match route.directions().as_slice() {
                [(dir1, dest1), (dir2, dest2), ..] => Dialog::WhichDirection {
                    dir1: dir1.to_string(),
                    dest1: dest1.to_string(),
                    dir2: dir2.to_string(),
                    dest2: dest2.to_string(),
                },
                [(dir, dest)] => Dialog::ConfirmDirection {
                    dir: dir.to_string(),
                    dest: dest.to_string(),
                },
                [] => {
                    debug!("Route {} lists no directions", route.short_name);
                    self.pending = Some(Pending::Route);
                    host.speak(Dialog::WhichRoute);
                    return;
                }
            };
            self.pending = Some(Pending::Direction);
            host.speak(prompt);
        } else {
            self.pending = Some(Pending::Route);
            host.speak(Dialog::WhichRoute);
        }
    }

    fn dispatch<H: Host>(&mut self, host: &mut H) {
        if self.tracking_requested {
            self.start_tracking(host);
        } else {
            self.arrivals(host);
        }
    }

    fn arrivals<H: Host>(&mut self, host: &mut H) {
        let Some(target) = self.selection.target() else {
            return;
        };
        let stop = self.selection.stop_name().unwrap_or_default().to_string();
        host.speak(Dialog::ServiceAnnouncement {
            route: self.selection.route_name().unwrap_or_default().to_string(),
            dest: self.selection.destination().unwrap_or_default().to_string(),
        });

        match self.tracker.arrivals(&self.gateway, target) {
            Ok(times) => {
                if announce::announce(host, &stop, &times, (self.clock)()) == 0 {
                    host.speak(Dialog::NoBusesFound { stop });
                }
            }
            Err(err) => {
                error!("Failed to load predictions: {err}");
                host.speak(Dialog::ErrorCallingServer);
            }
        }
    }

    fn start_tracking<H: Host>(&mut self, host: &mut H) {
        let Some(target) = self.selection.target() else {
            return;
        };
        let stop = self.selection.stop_name().unwrap_or_default().to_string();

        match self.tracker.start(&self.gateway, target) {
            Ok(Start::Tracking(times)) => {
                announce::announce(host, &stop, &times, (self.clock)());
                host.schedule_repeating(TRACKING_EVENT, self.config.tracking_interval());
            }
            Ok(Start::NoBuses) => host.speak(Dialog::NoBusesFound { stop }),
            Err(err) => {
                error!("Failed to load predictions: {err}");
                host.speak(Dialog::ErrorCallingServer);
            }
        }
    }

    fn finish_save<H: Host>(&mut self, host: &mut H, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match self.shortcuts.save(name, &self.selection) {
            Ok(()) => {
                host.register_vocabulary(name, SHORTCUT_VOCABULARY);
                host.speak(Dialog::SaveComplete {
                    shortcut: name.to_string(),
                });
            }
            Err(shortcuts::Error::IncompleteSelection) => host.speak(Dialog::NotEnoughInfo),
            Err(err) => {
                error!("Failed to save shortcut {name:?}: {err}");
                host.speak(Dialog::ShortcutFileError);
            }
        }
    }
}
