//! The world a translation pass reads from: gateways/listeners plus the
//! already-discovered backend endpoints routes may reference. Endpoint
//! discovery itself (watching EndpointSlices, resolving ServiceImports) is
//! out of scope here — the caller hands in a resolved snapshot.

use ahash::AHashMap;
use routeplane_core::backend::{AddressType, BackendKind, Endpoint, IpFamily};
use routeplane_core::gateway::GatewayArena;
use routeplane_core::resource::ResourceId;
use routeplane_core::route::Route;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendRecord {
    pub address_type: Option<AddressType>,
    pub ip_family: Option<IpFamily>,
    pub ports: AHashMap<u16, Vec<Endpoint>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackendKey<'a> {
    pub kind: BackendKind,
    pub resource: &'a ResourceId,
}

/// A snapshot of resolvable backends, keyed by kind and namespaced name.
/// Absence of an entry is indistinguishable from "not found yet" — both
/// translate to the same `BackendNotFound` outcome.
#[derive(Debug, Default)]
pub struct BackendIndex {
    records: AHashMap<(BackendKind, ResourceId), BackendRecord>,
}

impl BackendIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: BackendKind, resource: ResourceId, record: BackendRecord) {
        self.records.insert((kind, resource), record);
    }

    pub fn get(&self, kind: BackendKind, resource: &ResourceId) -> Option<&BackendRecord> {
        self.records.get(&(kind, resource.clone()))
    }
}

/// Everything a pass needs in hand before it starts: the gateway/listener
/// arena, every route to consider for attachment, and the resolved backend
/// snapshot used by the backend resolver.
#[derive(Debug, Default)]
pub struct TranslationInput {
    pub gateways: GatewayArena,
    pub routes: Vec<Route>,
    pub backends: BackendIndex,
}
