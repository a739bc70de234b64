//! The intermediate representation a translation pass produces: one route
//! list per listener, built from already-matched, already-resolved rules.
//! Nothing downstream of this module needs to know about Gateway API
//! resources again — IR is the contract with the data-plane translator.

use crate::backend::DestinationSetting;
use crate::gateway::ListenerId;
use crate::resource::GroupKindName;
use crate::routes::{GrpcRouteMatch, HeaderModifierFilter, HttpRouteMatch, RequestRedirectFilter, UrlRewriteFilter};
use ahash::AHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedDestination {
    pub setting: DestinationSetting,
    pub backend: GroupKindName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mirror {
    pub destination: WeightedDestination,
    pub percent: Option<(u32, u32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectResponse {
    pub status: u16,
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub filter: RequestRedirectFilter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteFilters {
    pub request_headers: Option<HeaderModifierFilter>,
    pub response_headers: Option<HeaderModifierFilter>,
    pub url_rewrite: Option<UrlRewriteFilter>,
}

impl Default for RewriteFilters {
    fn default() -> Self {
        Self {
            request_headers: None,
            response_headers: None,
            url_rewrite: None,
        }
    }
}

/// The per-rule action once matches have been satisfied: either a weighted
/// split across real destinations, a synthesized direct response (when every
/// destination in the rule was invalid), or a redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAction {
    Forward {
        destinations: Vec<WeightedDestination>,
        mirrors: Vec<Mirror>,
        rewrite: RewriteFilters,
    },
    Redirect(Redirect),
    DirectResponse(DirectResponse),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrHttpRule {
    pub name: String,
    pub hostname: String,
    pub matches: Vec<HttpRouteMatch>,
    pub action: RouteAction,
    pub route: GroupKindName,
    pub rule_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrGrpcRule {
    pub name: String,
    pub hostname: String,
    pub matches: Vec<GrpcRouteMatch>,
    pub action: RouteAction,
    pub route: GroupKindName,
    pub rule_index: usize,
}

/// Deterministic IR route name: `<route-id>/<rule-idx>/<match-idx>/<hostname>`,
/// with the hostname's dots replaced by underscores since they collide with
/// the downstream stats-tag extractor. `match_index` is empty for rules with
/// no matches of their own (the "matches every request" case).
pub fn ir_route_name(route_id: &str, rule_index: usize, match_index: Option<usize>, hostname: &str) -> String {
    let match_segment = match match_index {
        Some(i) => i.to_string(),
        None => String::new(),
    };
    let hostname_segment = hostname.replace('.', "_");
    format!("{route_id}/{rule_index}/{match_segment}/{hostname_segment}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsInspector {
    /// SNI hostnames this route accepts; intersected against the owning
    /// listener's hostname during attachment, never widened afterward.
    pub sni_hostnames: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrTlsRoute {
    pub inspector: TlsInspector,
    pub destinations: Vec<WeightedDestination>,
    pub route: GroupKindName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrTcpRoute {
    pub destinations: Vec<WeightedDestination>,
    pub route: GroupKindName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrUdpRoute {
    pub destinations: Vec<WeightedDestination>,
    pub route: GroupKindName,
}

/// Non-matching, non-destination knobs a rule can carry that a pipeline
/// records on the IR route rather than folding into `RouteAction` — kept
/// separate because they describe the rule's transport behavior, not its
/// routing decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrafficFeatures {
    pub request_timeout_millis: Option<u64>,
    pub backend_request_timeout_millis: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IrHttpRoute {
    pub rules: Vec<IrHttpRule>,
    pub features: Vec<TrafficFeatures>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IrGrpcRoute {
    pub rules: Vec<IrGrpcRule>,
}

/// Everything attached to a single listener after a translation pass:
/// one bucket per route kind, keyed only by listener since a listener
/// accepts at most one protocol family of routes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerRoutes {
    pub http: Vec<IrHttpRoute>,
    pub grpc: Vec<IrGrpcRoute>,
    pub tls: Vec<IrTlsRoute>,
    pub tcp: Vec<IrTcpRoute>,
    pub udp: Vec<IrUdpRoute>,
}

/// The top-level output of a translation pass: every listener's attached,
/// converted routes, plus the per-route status conditions to write back.
#[derive(Clone, Debug, Default)]
pub struct TranslationOutput {
    pub listeners: AHashMap<ListenerId, ListenerRoutes>,
    pub statuses: Vec<crate::route::RouteStatus>,
}

impl TranslationOutput {
    pub fn listener_mut(&mut self, id: ListenerId) -> &mut ListenerRoutes {
        self.listeners.entry(id).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DestinationSetting;

    #[test]
    fn listener_mut_creates_entry_on_first_access() {
        let mut output = TranslationOutput::default();
        let listener = ListenerId(0);
        output.listener_mut(listener).http.push(IrHttpRoute::default());
        assert_eq!(output.listeners.get(&listener).unwrap().http.len(), 1);
    }

    #[test]
    fn weighted_destination_carries_backend_identity() {
        let dest = WeightedDestination {
            setting: DestinationSetting::weight_only(5),
            backend: GroupKindName {
                group: "core".into(),
                kind: "Service".into(),
                name: "web".into(),
            },
        };
        assert_eq!(dest.setting.weight, 5);
    }

    #[test]
    fn route_name_replaces_dots_in_hostname() {
        let name = ir_route_name("default/web", 0, Some(0), "foo.example.com");
        assert_eq!(name, "default/web/0/0/foo_example_com");
    }

    #[test]
    fn route_name_omits_match_segment_when_absent() {
        let name = ir_route_name("default/web", 2, None, "*");
        assert_eq!(name, "default/web/2//*");
    }
}
