use crate::gateway::RouteInfo;

/// What the current request is about. Filled one field at a time, in route,
/// direction, stop order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub route: Option<RouteInfo>,
    pub direction: Option<usize>,
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
}

/// Identifiers of a fully resolved selection, as the prediction feed wants them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub route_id: &'a str,
    pub direction: usize,
    pub stop_id: &'a str,
}

impl Selection {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_complete(&self) -> bool {
        self.target().is_some() && self.stop_name.is_some()
    }

    pub fn target(&self) -> Option<Target<'_>> {
        Some(Target {
            route_id: &self.route.as_ref()?.id,
            direction: self.direction?,
            stop_id: self.stop_id.as_deref()?,
        })
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route.as_ref().map(|route| route.short_name.as_str())
    }

    /// `(direction, destination)` of the chosen direction.
    pub fn direction_pair(&self) -> Option<(&str, &str)> {
        self.route.as_ref()?.direction(self.direction?)
    }

    pub fn destination(&self) -> Option<&str> {
        self.direction_pair().map(|(_, dest)| dest)
    }

    pub fn stop_name(&self) -> Option<&str> {
        self.stop_name.as_deref()
    }

    /// Picks a new route and forgets everything chosen after it.
    pub fn set_route(&mut self, route: RouteInfo) {
        self.route = Some(route);
        self.direction = None;
        self.stop_id = None;
        self.stop_name = None;
    }

    /// Picks a new direction and forgets the stop, which belongs to the old one.
    pub fn set_direction(&mut self, direction: usize) {
        self.direction = Some(direction);
        self.stop_id = None;
        self.stop_name = None;
    }

    pub fn set_stop(&mut self, id: String, name: String) {
        self.stop_id = Some(id);
        self.stop_name = Some(name);
    }
}
