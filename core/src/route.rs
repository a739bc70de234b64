//! Route resources as the translator ingests them: a kind-tagged envelope
//! plus the rules specific to each Gateway API route kind. Conversion from
//! these into IR (`crate::ir`) is the job of each `translate::pipelines`
//! module; this module only carries the input shape.

use crate::backend::BackendRef;
use crate::condition::Condition;
use crate::resource::{GroupKindName, ResourceId};
use crate::routes::{GrpcRouteMatch, HttpRouteMatch, PathModifier};
use std::num::NonZeroU16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Http,
    Grpc,
    Tls,
    Tcp,
    Udp,
}

/// A route rule's reference to the Gateway (or other supported parent) it
/// attaches to, as written in `spec.parentRefs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentReference {
    pub group: Option<String>,
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub section_name: Option<String>,
    pub port: Option<NonZeroU16>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRouteRule {
    pub matches: Vec<HttpRouteMatch>,
    pub filters: Vec<HttpRouteFilter>,
    pub backends: Vec<BackendRef>,
    pub timeouts: Option<RouteTimeouts>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HttpRouteFilter {
    RequestHeaderModifier(crate::routes::HeaderModifierFilter),
    ResponseHeaderModifier(crate::routes::HeaderModifierFilter),
    RequestRedirect(crate::routes::RequestRedirectFilter),
    UrlRewrite(crate::routes::UrlRewriteFilter),
    RequestMirror(crate::routes::RequestMirrorFilter),
    ExtensionRef(GroupKindName),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteTimeouts {
    pub request_millis: Option<u64>,
    pub backend_request_millis: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrpcRouteRule {
    pub matches: Vec<GrpcRouteMatch>,
    pub filters: Vec<GrpcRouteFilter>,
    pub backends: Vec<BackendRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrpcRouteFilter {
    RequestHeaderModifier(crate::routes::HeaderModifierFilter),
    ResponseHeaderModifier(crate::routes::HeaderModifierFilter),
    RequestMirror(crate::routes::RequestMirrorFilter),
    ExtensionRef(GroupKindName),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsRouteRule {
    pub sni_hostnames: Vec<String>,
    pub backends: Vec<BackendRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpRouteRule {
    pub backends: Vec<BackendRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UdpRouteRule {
    pub backends: Vec<BackendRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteRules {
    Http(Vec<HttpRouteRule>),
    Grpc(Vec<GrpcRouteRule>),
    Tls(Vec<TlsRouteRule>),
    Tcp(Vec<TcpRouteRule>),
    Udp(Vec<UdpRouteRule>),
}

impl RouteRules {
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Http(_) => RouteKind::Http,
            Self::Grpc(_) => RouteKind::Grpc,
            Self::Tls(_) => RouteKind::Tls,
            Self::Tcp(_) => RouteKind::Tcp,
            Self::Udp(_) => RouteKind::Udp,
        }
    }
}

/// A route resource, identified by namespace/name, independent of any
/// particular parent it may attach to. `generation` feeds `observedGeneration`
/// on the status conditions written for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub resource: ResourceId,
    pub generation: i64,
    pub hostnames: Vec<String>,
    pub parent_refs: Vec<ParentReference>,
    pub rules: RouteRules,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        self.rules.kind()
    }

    pub fn group_kind_name(&self) -> GroupKindName {
        let kind = match self.kind() {
            RouteKind::Http => "HTTPRoute",
            RouteKind::Grpc => "GRPCRoute",
            RouteKind::Tls => "TLSRoute",
            RouteKind::Tcp => "TCPRoute",
            RouteKind::Udp => "UDPRoute",
        };
        GroupKindName {
            group: "gateway.networking.k8s.io".into(),
            kind: kind.into(),
            name: self.resource.name.clone().into(),
        }
    }
}

/// The status a translation pass writes back for one `parentRef` of one
/// route: which parent it resolved against, and the conditions describing
/// the outcome of attachment and reference resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteParentStatus {
    pub parent_ref: ParentReference,
    pub controller_name: String,
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteStatus {
    pub route: GroupKindName,
    pub namespace: String,
    pub parents: Vec<RouteParentStatus>,
}

/// Just the path-rewrite half of a filter set, factored out so the HTTP and
/// GRPC pipelines can share `PathModifier` handling without duplicating it.
pub fn path_modifier_target(modifier: &PathModifier) -> &str {
    match modifier {
        PathModifier::Full(p) => p,
        PathModifier::Prefix(p) => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_kind_name_uses_gateway_api_group() {
        let route = Route {
            resource: ResourceId::new("default", "web"),
            generation: 1,
            hostnames: vec![],
            parent_refs: vec![],
            rules: RouteRules::Http(vec![]),
        };
        let gkn = route.group_kind_name();
        assert_eq!(gkn.group, "gateway.networking.k8s.io");
        assert_eq!(gkn.kind, "HTTPRoute");
    }
}
