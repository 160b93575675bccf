//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled body rules in declaration order
//! - Resolve the target URI for a buffered request body
//! - Report which rule matched, or that the default was used
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Every target URI is parsed once at startup, never per request
//! - First match wins; the default is only consulted when no rule matches

use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::config::RoutingConfig;
use crate::routing::matcher::{decode_body, SubstringMatcher};
use crate::routing::template::{self, TemplateError};

/// Error building a [`Router`] from configuration.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid default target template: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("rule #{index} has an empty trigger")]
    EmptyTrigger { index: usize },
}

/// Parse an absolute `http`/`https` target URI.
pub fn parse_target(raw: &str) -> Result<Uri, RoutingError> {
    let invalid = |reason: String| RoutingError::InvalidTarget {
        target: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    raw.parse::<Uri>().map_err(|e| invalid(e.to_string()))
}

/// Render the default template with the stage and parse the result.
pub fn resolve_default_target(config: &RoutingConfig) -> Result<Uri, RoutingError> {
    let rendered = template::render(&config.default_target_template, &config.stage)?;
    parse_target(&rendered)
}

/// A compiled body rule.
#[derive(Debug, Clone)]
pub struct Route {
    matcher: SubstringMatcher,
    target: Uri,
}

impl Route {
    pub fn new(trigger: impl Into<String>, target: Uri) -> Self {
        Self {
            matcher: SubstringMatcher::new(trigger),
            target,
        }
    }

    pub fn trigger(&self) -> &str {
        self.matcher.trigger()
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }
}

/// Result of a route lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// A rule's trigger was found in the body.
    Rule {
        index: usize,
        trigger: &'a str,
        target: &'a Uri,
    },
    /// No rule matched; the default target applies.
    Default { target: &'a Uri },
}

impl<'a> RouteMatch<'a> {
    pub fn target(&self) -> &'a Uri {
        match self {
            RouteMatch::Rule { target, .. } | RouteMatch::Default { target } => target,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'a str {
        match self {
            RouteMatch::Rule { trigger, .. } => trigger,
            RouteMatch::Default { .. } => "default",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, RouteMatch::Default { .. })
    }
}

/// Ordered body-substring routing table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
    default_target: Option<Uri>,
}

impl Router {
    /// Build a table from already-compiled routes.
    ///
    /// A table without a default leaves unmatched bodies unrouted, which lets
    /// an embedding pipeline hand those requests to its next handler.
    pub fn new(routes: Vec<Route>, default_target: Option<Uri>) -> Self {
        Self {
            routes,
            default_target,
        }
    }

    /// Compile the routing section of the configuration.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, RoutingError> {
        let default_target = resolve_default_target(config)?;

        let routes = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                if rule.trigger.is_empty() {
                    return Err(RoutingError::EmptyTrigger { index });
                }
                Ok(Route::new(rule.trigger.clone(), parse_target(&rule.target)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(routes, Some(default_target)))
    }

    /// Resolve the target for decoded body text.
    pub fn match_text(&self, body: &str) -> Option<RouteMatch<'_>> {
        let rule = self
            .routes
            .iter()
            .enumerate()
            .find(|(_, route)| route.matcher.matches(body));

        match rule {
            Some((index, route)) => Some(RouteMatch::Rule {
                index,
                trigger: route.trigger(),
                target: &route.target,
            }),
            None => self
                .default_target
                .as_ref()
                .map(|target| RouteMatch::Default { target }),
        }
    }

    /// Resolve the target for a raw buffered body.
    pub fn match_body(&self, body: &[u8]) -> Option<RouteMatch<'_>> {
        self.match_text(&decode_body(body))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn default_target(&self) -> Option<&Uri> {
        self.default_target.as_ref()
    }
}
