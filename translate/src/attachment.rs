//! Parent-attachment resolution (one outcome per `parentRef`, per the
//! Gateway API's per-parent status model): find the listener(s) a route
//! attaches to on its referenced gateway, honoring `allowedRoutes`
//! kind/namespace restrictions, readiness, the L4 one-route-per-listener
//! rule, and hostname/SNI intersection.

use crate::hostname;
use crate::input::TranslationInput;
use routeplane_core::condition::Reason;
use routeplane_core::gateway::{GatewayId, Listener, ListenerId, ProtocolType};
use routeplane_core::gateway::FromNamespaces;
use routeplane_core::resource::ResourceId;
use routeplane_core::route::{ParentReference, Route, RouteKind};

/// Every listener a `parentRef` ultimately attached to, paired with its
/// intersected hostnames (empty for TCP/UDP, which don't hostname-match).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachedListener {
    pub listener: ListenerId,
    pub hostnames: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParentAttachment {
    Attached(Vec<AttachedListener>),
    Rejected { reason: Reason, message: String },
}

fn route_kind_allowed(listener: &Listener, kind: RouteKind) -> bool {
    match &listener.allowed_routes.kinds {
        None => matches!(
            (listener.protocol, kind),
            (ProtocolType::Http, RouteKind::Http)
                | (ProtocolType::Https, RouteKind::Http)
                | (ProtocolType::Https, RouteKind::Grpc)
                | (ProtocolType::Http, RouteKind::Grpc)
                | (ProtocolType::Grpc, RouteKind::Grpc)
                | (ProtocolType::Tls, RouteKind::Tls)
                | (ProtocolType::Tcp, RouteKind::Tcp)
                | (ProtocolType::Udp, RouteKind::Udp)
        ),
        Some(kinds) => kinds.iter().any(|gkn| match kind {
            RouteKind::Http => gkn.kind == "HTTPRoute",
            RouteKind::Grpc => gkn.kind == "GRPCRoute",
            RouteKind::Tls => gkn.kind == "TLSRoute",
            RouteKind::Tcp => gkn.kind == "TCPRoute",
            RouteKind::Udp => gkn.kind == "UDPRoute",
        }),
    }
}

/// `allowedRoutes.namespaces` resolution. `Selector` is recorded but cannot
/// be evaluated here: the translator doesn't ingest namespace labels, so a
/// selector restriction is treated as "no additional routes admitted" until
/// a caller supplies label data through a future input extension.
fn namespace_allowed(listener_namespace: &str, route_namespace: &str, from: &FromNamespaces) -> bool {
    match from {
        FromNamespaces::All => true,
        FromNamespaces::Same => listener_namespace == route_namespace,
        FromNamespaces::Selector(_) => false,
    }
}

fn section_matches(listener: &Listener, parent_ref: &ParentReference) -> bool {
    match &parent_ref.section_name {
        Some(name) => &listener.name == name,
        None => true,
    }
}

fn port_matches(listener: &Listener, parent_ref: &ParentReference) -> bool {
    match parent_ref.port {
        Some(port) => listener.port == port.get(),
        None => true,
    }
}

/// Resolves a single `parentRef`, implementing the algorithm of the
/// parent-attachment resolver: selected listeners, kind/namespace admission,
/// readiness (checked against the pre-filter selected set), the L4
/// one-route-per-listener rule, and hostname intersection. Mutates the
/// arena's attached-route counters for every listener that is admitted.
pub fn resolve_parent(
    input: &mut TranslationInput,
    route_namespace: &str,
    route_kind: RouteKind,
    route_hostnames: &[String],
    parent_ref: &ParentReference,
) -> ParentAttachment {
    if let Some(kind) = &parent_ref.kind {
        if kind != "Gateway" {
            return ParentAttachment::Rejected {
                reason: Reason::InvalidKind,
                message: format!("unsupported parent kind {kind}"),
            };
        }
    }

    let parent_namespace = parent_ref
        .namespace
        .clone()
        .unwrap_or_else(|| route_namespace.to_string());
    let gateway_resource = ResourceId::new(parent_namespace, parent_ref.name.clone());

    let Some(gateway_id) = find_gateway(input, &gateway_resource) else {
        return ParentAttachment::Rejected {
            reason: Reason::NoMatchingParent,
            message: format!("no such gateway {gateway_resource}"),
        };
    };

    let selected: Vec<ListenerId> = input
        .gateways
        .listeners_of(gateway_id)
        .filter(|l| section_matches(l, parent_ref) && port_matches(l, parent_ref))
        .map(|l| l.id)
        .collect();

    if selected.is_empty() {
        return ParentAttachment::Rejected {
            reason: Reason::NoMatchingParent,
            message: "no listener matches sectionName/port".to_string(),
        };
    }

    let listener_namespace = input.gateways.gateway(gateway_id).resource.namespace.clone();
    let admitted: Vec<ListenerId> = selected
        .iter()
        .copied()
        .filter(|id| {
            let l = input.gateways.listener(*id);
            route_kind_allowed(l, route_kind)
                && namespace_allowed(&listener_namespace, route_namespace, &l.allowed_routes.namespaces)
        })
        .collect();

    if admitted.is_empty() {
        return ParentAttachment::Rejected {
            reason: Reason::NotAllowedByListeners,
            message: "no listener admits this route kind/namespace".to_string(),
        };
    }

    for id in &admitted {
        input.gateways.increment_attached_routes(*id);
    }

    let any_selected_ready = selected.iter().any(|id| input.gateways.listener(*id).ready);
    if !any_selected_ready {
        return ParentAttachment::Rejected {
            reason: Reason::NoMatchingParent,
            message: "no selected listener is ready".to_string(),
        };
    }

    match route_kind {
        RouteKind::Tcp | RouteKind::Udp => attach_l4(input, &admitted, route_kind),
        _ => attach_hostnamed(input, &admitted, route_hostnames),
    }
}

fn find_gateway(input: &TranslationInput, resource: &ResourceId) -> Option<GatewayId> {
    input.gateways.gateways().find(|gw| &gw.resource == resource).map(|gw| gw.id)
}

/// TCP/UDP listeners accept at most one attached route; a listener whose
/// counter already exceeded one for this pass is excluded.
fn attach_l4(input: &TranslationInput, admitted: &[ListenerId], kind: RouteKind) -> ParentAttachment {
    let accepted: Vec<AttachedListener> = admitted
        .iter()
        .filter(|id| input.gateways.attached_routes(**id) <= 1)
        .map(|id| AttachedListener {
            listener: *id,
            hostnames: Vec::new(),
        })
        .collect();

    if accepted.is_empty() {
        let kind_name = if kind == RouteKind::Tcp { "TCP" } else { "UDP" };
        return ParentAttachment::Rejected {
            reason: Reason::UnsupportedValue,
            message: format!("Multiple routes on the same {kind_name} listener"),
        };
    }

    ParentAttachment::Attached(accepted)
}

fn attach_hostnamed(
    input: &TranslationInput,
    admitted: &[ListenerId],
    route_hostnames: &[String],
) -> ParentAttachment {
    let accepted: Vec<AttachedListener> = admitted
        .iter()
        .filter_map(|id| {
            let listener = input.gateways.listener(*id);
            let hostnames = hostname::intersect(route_hostnames, listener.hostname.as_deref());
            if hostnames.is_empty() {
                None
            } else {
                Some(AttachedListener {
                    listener: *id,
                    hostnames,
                })
            }
        })
        .collect();

    if accepted.is_empty() {
        return ParentAttachment::Rejected {
            reason: Reason::NoMatchingListenerHostname,
            message: "no overlapping hostname".to_string(),
        };
    }

    ParentAttachment::Attached(accepted)
}

/// Resolves every `parentRef` of a route, flattening per-parent outcomes.
pub fn resolve_route(input: &mut TranslationInput, route: &Route) -> Vec<(ParentReference, ParentAttachment)> {
    route
        .parent_refs
        .clone()
        .into_iter()
        .map(|parent_ref| {
            let outcome = resolve_parent(
                input,
                &route.resource.namespace,
                route.kind(),
                &route.hostnames,
                &parent_ref,
            );
            (parent_ref, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeplane_core::gateway::{AllowedRoutes, GatewayArena};

    fn sample_input() -> (TranslationInput, ListenerId) {
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
        (
            TranslationInput {
                gateways,
                routes: Vec::new(),
                backends: Default::default(),
            },
            listener,
        )
    }

    fn parent_ref() -> ParentReference {
        ParentReference {
            group: None,
            kind: None,
            namespace: None,
            name: "gw".into(),
            section_name: None,
            port: None,
        }
    }

    #[test]
    fn attaches_when_kind_and_namespace_allowed() {
        let (mut input, listener) = sample_input();
        let outcome = resolve_parent(&mut input, "default", RouteKind::Http, &[], &parent_ref());
        match outcome {
            ParentAttachment::Attached(listeners) => {
                assert_eq!(listeners.len(), 1);
                assert_eq!(listeners[0].listener, listener);
            }
            other => panic!("expected attachment, got {other:?}"),
        }
    }

    #[test]
    fn rejects_nonexistent_gateway() {
        let (mut input, _listener) = sample_input();
        let mut bad_ref = parent_ref();
        bad_ref.name = "missing".into();
        let outcome = resolve_parent(&mut input, "default", RouteKind::Http, &[], &bad_ref);
        assert!(matches!(
            outcome,
            ParentAttachment::Rejected { reason: Reason::NoMatchingParent, .. }
        ));
    }

    #[test]
    fn rejects_disallowed_kind() {
        let mut gateways = GatewayArena::new();
        let gw = gateways.insert_gateway(ResourceId::new("default", "gw"), "istio".into());
        gateways.insert_listener(
            gw,
            "tcp".into(),
            None,
            9000,
            ProtocolType::Tcp,
            None,
            AllowedRoutes::default(),
            true,
        );
        let mut input = TranslationInput {
            gateways,
            routes: Vec::new(),
            backends: Default::default(),
        };
        let outcome = resolve_parent(&mut input, "default", RouteKind::Http, &[], &parent_ref());
        assert!(matches!(
            outcome,
            ParentAttachment::Rejected { reason: Reason::NotAllowedByListeners, .. }
        ));
    }

    #[test]
    fn not_ready_listener_rejects_attachment() {
        let mut gateways = GatewayArena::new();
        let gw = gateways.insert_gateway(ResourceId::new("default", "gw"), "istio".into());
        gateways.insert_listener(
            gw,
            "http".into(),
            None,
            80,
            ProtocolType::Http,
            None,
            AllowedRoutes::default(),
            false,
        );
        let mut input = TranslationInput {
            gateways,
            routes: Vec::new(),
            backends: Default::default(),
        };
        let outcome = resolve_parent(&mut input, "default", RouteKind::Http, &[], &parent_ref());
        assert!(matches!(outcome, ParentAttachment::Rejected { .. }));
    }

    #[test]
    fn second_tcp_route_on_same_listener_is_rejected() {
        let mut gateways = GatewayArena::new();
        let gw = gateways.insert_gateway(ResourceId::new("default", "gw"), "istio".into());
        gateways.insert_listener(
            gw,
            "tcp".into(),
            None,
            9000,
            ProtocolType::Tcp,
            None,
            AllowedRoutes::default(),
            true,
        );
        let mut input = TranslationInput {
            gateways,
            routes: Vec::new(),
            backends: Default::default(),
        };

        let first = resolve_parent(&mut input, "default", RouteKind::Tcp, &[], &parent_ref());
        assert!(matches!(first, ParentAttachment::Attached(_)));

        let second = resolve_parent(&mut input, "default", RouteKind::Tcp, &[], &parent_ref());
        assert!(matches!(
            second,
            ParentAttachment::Rejected { reason: Reason::UnsupportedValue, .. }
        ));
    }
}
