//! The destination side of a translated route: what a backend reference
//! resolves to, and the weighted, per-protocol settings the IR carries
//! forward to the data-plane translator.

use crate::routes::{HeaderModifierFilter, RequestMirrorFilter, UrlRewriteFilter};
use std::net::IpAddr;
use std::num::NonZeroU16;

/// The kind of object a `BackendRef` targets. Defaults to `Service` when a
/// reference omits `kind`, per the Gateway API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Service,
    ServiceImport,
    Backend,
}

/// A route rule's reference to a backend, as written by the user. Not yet
/// validated or resolved; see `translate::backend::resolve`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendRef {
    pub kind: BackendKind,
    pub name: String,
    pub namespace: String,
    pub port: Option<NonZeroU16>,
    pub weight: u32,
    pub filters: Vec<BackendFilter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendFilter {
    RequestHeaderModifier(HeaderModifierFilter),
    ResponseHeaderModifier(HeaderModifierFilter),
    UrlRewrite(UrlRewriteFilter),
    RequestMirror(RequestMirrorFilter),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Http2,
    Grpc,
    Tcp,
    Udp,
    Https,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressType {
    Ip,
    Fqdn,
    Mixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
    Dual,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Socket { host: EndpointHost, port: u16 },
    Unix { path: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointHost {
    Ip(IpAddr),
    Fqdn(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendTls {
    pub ca_cert_ref: crate::resource::ResourceId,
    pub sni: Option<String>,
}

/// A single backend's resolved contribution to a route's destination list.
/// Per the spec: a reference-resolution failure still yields a
/// weight-only setting (no endpoints) so it continues to participate in
/// weighted 5xx synthesis against its peers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationSetting {
    pub weight: u32,
    pub protocol: Option<Protocol>,
    pub endpoints: Vec<Endpoint>,
    pub address_type: Option<AddressType>,
    pub backend_tls: Option<BackendTls>,
    pub filters: Vec<BackendFilter>,
    pub ip_family: Option<IpFamily>,
    pub priority: Option<u8>,
}

impl DestinationSetting {
    /// A destination carrying only a weight: the backend reference could not
    /// be resolved, but it must still count against its peers' weighted
    /// share of synthesized failure responses.
    pub fn weight_only(weight: u32) -> Self {
        Self {
            weight,
            protocol: None,
            endpoints: Vec::new(),
            address_type: None,
            backend_tls: None,
            filters: Vec::new(),
            ip_family: None,
            priority: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

/// Aggregates the address types observed across a set of endpoints into a
/// single destination-level type. Used both for `Backend` CRD endpoints and
/// for per-destination consistency checks across a rule's backends.
///
/// The resulting type is the unique type whose count equals the total; any
/// other split resolves to `Mixed`, and an empty input leaves the type unset.
pub fn aggregate_address_type<I>(counts: I) -> Option<AddressType>
where
    I: IntoIterator<Item = (AddressType, usize)>,
{
    let counts: Vec<(AddressType, usize)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return None;
    }
    counts
        .into_iter()
        .find(|(_, n)| *n == total)
        .map(|(ty, _)| ty)
        .or(Some(AddressType::Mixed))
}
