use tracing::info;

use crate::config::frames::ROUTE_PREFIX;

/// Parsed location: the gallery overview or one focused frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Overview,
    Item(String),
}

impl Route {
    /// `/item/<id>` is an item route; every other path is the overview
    pub fn parse(path: &str) -> Self {
        match path.strip_prefix(ROUTE_PREFIX) {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Item(id.to_string()),
            _ => Route::Overview,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Overview => "/".to_string(),
            Route::Item(id) => format!("{ROUTE_PREFIX}{id}"),
        }
    }

    pub fn item(id: impl Into<String>) -> Self {
        Route::Item(id.into())
    }
}

/// Client-side location holder
#[derive(Debug, Clone)]
pub struct Router {
    location: String,
    route: Route,
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Router {
    pub fn new(initial: &str) -> Self {
        Self {
            location: initial.to_string(),
            route: Route::parse(initial),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The `:id` segment of the current item route, if any
    pub fn route_param(&self) -> Option<&str> {
        match &self.route {
            Route::Item(id) => Some(id),
            Route::Overview => None,
        }
    }

    pub fn navigate(&mut self, route: Route) {
        let path = route.path();
        if path != self.location {
            info!(from = %self.location, to = %path, "navigate");
        }
        self.location = path;
        self.route = route;
    }
}
