//! The top-level translation entrypoint: a single pure function over one
//! `TranslationInput` snapshot, producing a `TranslationOutput` plus the
//! status to write back per route. The caller must zero the input's
//! attached-route counters before each call; the pass only increments them.

use crate::attachment::{resolve_route, ParentAttachment};
use crate::backend_resolver::resolve_one;
use crate::config::TranslatorConfig;
use crate::input::TranslationInput;
use crate::pipelines::{grpc, http, tcp, tls, udp};
use crate::status::parent_status;
use routeplane_core::ir::TranslationOutput;
use routeplane_core::route::{RouteKind, RouteRules, RouteStatus};

pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn translate(&self, input: &mut TranslationInput) -> TranslationOutput {
        input.gateways.reset_attached_routes();

        let mut output = TranslationOutput::default();
        let now = self.config.clock.now();
        let routes = input.routes.clone();

        for route in &routes {
            let per_parent = resolve_route(input, route);
            let invalid_rule_count = has_invalid_rule_cardinality(route);
            let all_backend_refs = route_backend_refs(route);
            let any_unresolved = all_backend_refs
                .iter()
                .any(|b| resolve_one(&input.backends, b).error.is_some());

            let unresolved = if invalid_rule_count {
                Some((
                    routeplane_core::condition::Reason::InvalidRule,
                    "TCP/UDP routes must declare exactly one rule",
                ))
            } else {
                None
            };

            let mut parents = Vec::with_capacity(per_parent.len());
            for (parent_ref, outcome) in per_parent {
                if !invalid_rule_count {
                    if let ParentAttachment::Attached(listeners) = &outcome {
                        for attached in listeners {
                            attach_to_listener(&mut output, input, route, attached.listener, attached.hostnames.clone());
                        }
                    }
                }
                parents.push(parent_status(
                    parent_ref,
                    &self.config.controller_name,
                    &outcome,
                    !any_unresolved && !invalid_rule_count,
                    unresolved,
                    route.generation,
                    now,
                ));
            }

            output.statuses.push(RouteStatus {
                route: route.group_kind_name(),
                namespace: route.resource.namespace.clone(),
                parents,
            });
        }

        output
    }
}

/// TCP and UDP routes must declare exactly one rule; any other count is a
/// rule-cardinality error that skips IR emission for the whole route.
fn has_invalid_rule_cardinality(route: &routeplane_core::route::Route) -> bool {
    match &route.rules {
        RouteRules::Tcp(rules) => rules.len() != 1,
        RouteRules::Udp(rules) => rules.len() != 1,
        _ => false,
    }
}

fn route_backend_refs(route: &routeplane_core::route::Route) -> Vec<routeplane_core::backend::BackendRef> {
    match &route.rules {
        RouteRules::Http(rules) => rules.iter().flat_map(|r| r.backends.clone()).collect(),
        RouteRules::Grpc(rules) => rules.iter().flat_map(|r| r.backends.clone()).collect(),
        RouteRules::Tls(rules) => rules.iter().flat_map(|r| r.backends.clone()).collect(),
        RouteRules::Tcp(rules) => rules.iter().flat_map(|r| r.backends.clone()).collect(),
        RouteRules::Udp(rules) => rules.iter().flat_map(|r| r.backends.clone()).collect(),
    }
}

fn attach_to_listener(
    output: &mut TranslationOutput,
    input: &TranslationInput,
    route: &routeplane_core::route::Route,
    listener: routeplane_core::gateway::ListenerId,
    hostnames: Vec<String>,
) {
    let listener_port = input.gateways.listener(listener).port;
    let bucket = output.listener_mut(listener);
    match route.kind() {
        RouteKind::Http => {
            if let Some(ir) = http::convert(input, route, &hostnames, listener_port) {
                bucket.http.push(ir);
            }
        }
        RouteKind::Grpc => {
            if let Some(ir) = grpc::convert(input, route, &hostnames) {
                bucket.grpc.push(ir);
            }
        }
        RouteKind::Tls => {
            if let Some(ir) = tls::convert(input, route, hostnames) {
                bucket.tls.push(ir);
            }
        }
        RouteKind::Tcp => {
            if let Some(ir) = tcp::convert(input, route) {
                bucket.tcp.push(ir);
            }
        }
        RouteKind::Udp => {
            if let Some(ir) = udp::convert(input, route) {
                bucket.udp.push(ir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Clock;
    use chrono::{DateTime, Utc};
    use routeplane_core::backend::{BackendKind, Endpoint, EndpointHost};
    use routeplane_core::gateway::{AllowedRoutes, GatewayArena, ProtocolType};
    use routeplane_core::resource::ResourceId;
    use routeplane_core::route::{HttpRouteRule, ParentReference, Route, RouteRules};
    use routeplane_core::routes::HttpRouteMatch;
    use std::net::{IpAddr, Ipv4Addr};

    struct FixedClock(DateTime<Utc>);
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_config() -> TranslatorConfig {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        TranslatorConfig::with_clock("example.io/controller", Box::new(FixedClock(now)))
    }

    #[test]
    fn end_to_end_http_route_attaches_and_resolves() {
        let mut gateways = GatewayArena::new();
        let gw = gateways.insert_gateway(ResourceId::new("default", "gw"), "istio".into());
        let listener = gateways.insert_listener(
            gw,
            "http".into(),
            None,
            80,
            ProtocolType::Http,
            None,
            AllowedRoutes::default(),
            true,
        );

        let mut backends = crate::input::BackendIndex::new();
        let mut record = crate::input::BackendRecord::default();
        record.ports.insert(
            8080,
            vec![Endpoint::Socket {
                host: EndpointHost::Ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
                port: 8080,
            }],
        );
        backends.insert(BackendKind::Service, ResourceId::new("default", "web"), record);

        let route = Route {
            resource: ResourceId::new("default", "web-route"),
            generation: 2,
            hostnames: vec![],
            parent_refs: vec![ParentReference {
                group: None,
                kind: None,
                namespace: None,
                name: "gw".into(),
                section_name: None,
                port: None,
            }],
            rules: RouteRules::Http(vec![HttpRouteRule {
                matches: vec![HttpRouteMatch::default()],
                filters: vec![],
                backends: vec![routeplane_core::backend::BackendRef {
                    kind: BackendKind::Service,
                    name: "web".into(),
                    namespace: "default".into(),
                    port: std::num::NonZeroU16::new(8080),
                    weight: 1,
                    filters: vec![],
                }],
                timeouts: None,
            }]),
        };

        let mut input = TranslationInput {
            gateways,
            routes: vec![route],
            backends,
        };

        let translator = Translator::new(fixed_config());
        let output = translator.translate(&mut input);

        assert_eq!(output.statuses.len(), 1);
        assert_eq!(output.statuses[0].parents.len(), 1);
        assert!(output
            .statuses[0]
            .parents[0]
            .conditions
            .iter()
            .all(|c| c.status == routeplane_core::condition::ConditionStatus::True));

        let listener_routes = output.listeners.get(&listener).expect("listener attached");
        assert_eq!(listener_routes.http.len(), 1);
        assert_eq!(listener_routes.http[0].rules.len(), 1);
    }
}
