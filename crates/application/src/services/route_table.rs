use ferrous_relay_domain::config::{RouteMatch, RouteTarget};
use ferrous_relay_domain::{ConfigError, DnsRequest, RouteConfig};
use ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::sync::Arc;

use super::drop_handler::DropHandler;
use crate::ports::QueryHandler;

/// Predicate half of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    /// Client address inside the network.
    Prefix(IpNetwork),
    /// Query name ends with `suffix`. With `label_boundary` the match must
    /// start a label and is ASCII case-insensitive.
    Suffix { suffix: String, label_boundary: bool },
}

impl RouteMatcher {
    pub fn matches(&self, request: &DnsRequest) -> bool {
        match self {
            Self::Prefix(network) => network.contains(request.client_ip),
            Self::Suffix {
                suffix,
                label_boundary: false,
            } => request.domain.ends_with(suffix.as_str()),
            Self::Suffix {
                suffix,
                label_boundary: true,
            } => ends_with_label(&request.domain, suffix),
        }
    }
}

fn ends_with_label(domain: &str, suffix: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let suffix = suffix.trim_start_matches('.').trim_end_matches('.');
    if suffix.is_empty() {
        return true;
    }
    if domain.len() < suffix.len() {
        return false;
    }

    let split = domain.len() - suffix.len();
    if !domain.is_char_boundary(split) || !domain[split..].eq_ignore_ascii_case(suffix) {
        return false;
    }
    split == 0 || domain.as_bytes()[split - 1] == b'.'
}

struct Route {
    matcher: RouteMatcher,
    handler: Arc<dyn QueryHandler>,
}

/// Ordered route list. Evaluation is strictly in configuration order and
/// the first matching route wins, regardless of prefix length.
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn build(
        routes: &[RouteConfig],
        pools: &HashMap<String, Arc<dyn QueryHandler>>,
    ) -> Result<Self, ConfigError> {
        let drop: Arc<dyn QueryHandler> = Arc::new(DropHandler);

        let routes = routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                let matcher = match route.match_key(index)? {
                    RouteMatch::Prefix(network) => RouteMatcher::Prefix(network),
                    RouteMatch::Suffix {
                        suffix,
                        label_boundary,
                    } => RouteMatcher::Suffix {
                        suffix,
                        label_boundary,
                    },
                };
                let handler = match route.target(index)? {
                    RouteTarget::Drop => Arc::clone(&drop),
                    RouteTarget::Pool(pool) => pools
                        .get(&pool)
                        .cloned()
                        .ok_or(ConfigError::UnknownPool { index, pool })?,
                };
                Ok(Route { matcher, handler })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { routes })
    }

    pub fn find(&self, request: &DnsRequest) -> Option<Arc<dyn QueryHandler>> {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(request))
            .map(|route| Arc::clone(&route.handler))
    }
}
