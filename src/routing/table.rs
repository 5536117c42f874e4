//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Map an inbound path to a service name and forward path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - First configured entry whose prefix matches wins; nested prefixes
//!   (e.g. "/auth" and "/auth/admin") resolve by config order, so the more
//!   specific entry must be listed first
//! - Explicit None rather than silent default

use crate::config::RouteConfig;

/// A compiled route entry.
#[derive(Debug, Clone)]
struct Route {
    service: String,
    path_prefix: String,
    forward_prefix: String,
}

/// Result of a successful route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Logical service name owning the path.
    pub service: String,
    /// Path to forward to the resolved instance. Always starts with '/'.
    pub forward_path: String,
}

/// Immutable table of configured routes.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile a table from configuration. Config order is preserved.
    pub fn from_config(configs: &[RouteConfig]) -> Self {
        let routes = configs
            .iter()
            .map(|c| Route {
                service: c.service.clone(),
                path_prefix: c.path_prefix.clone(),
                forward_prefix: c.forward_prefix.clone(),
            })
            .collect();
        Self { routes }
    }

    /// Look up the first route whose prefix literally matches `path`.
    ///
    /// The matched prefix is stripped, the remainder is normalized to start
    /// with '/' (a path equal to its prefix forwards as "/"), and the
    /// route's forward prefix is prepended.
    pub fn route(&self, path: &str) -> Option<RouteMatch> {
        let route = self
            .routes
            .iter()
            .find(|r| path.starts_with(r.path_prefix.as_str()))?;

        let remainder = &path[route.path_prefix.len()..];
        let mut forward_path =
            String::with_capacity(route.forward_prefix.len() + remainder.len() + 1);
        forward_path.push_str(&route.forward_prefix);
        if !remainder.starts_with('/') {
            forward_path.push('/');
        }
        forward_path.push_str(remainder);

        Some(RouteMatch {
            service: route.service.clone(),
            forward_path,
        })
    }

    /// Number of configured routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
