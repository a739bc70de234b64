//! Gateways and listeners, addressed by stable arena ids rather than by
//! `Rc`/`RefCell` back-references. A pass owns one `GatewayArena` per batch
//! of input and indexes into it instead of chasing pointers, the same way
//! the teacher's index crates key maps by `ResourceId` rather than holding
//! live references into each other's state.

use crate::resource::ResourceId;
use crate::routes::Scheme;
use ahash::AHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GatewayId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolType {
    Http,
    Https,
    Tls,
    Tcp,
    Udp,
    Grpc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TlsMode {
    Terminate,
    Passthrough,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FromNamespaces {
    All,
    Same,
    Selector(AHashMap<String, String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowedRoutes {
    pub namespaces: FromNamespaces,
    pub kinds: Option<Vec<crate::resource::GroupKindName>>,
}

impl Default for AllowedRoutes {
    fn default() -> Self {
        Self {
            namespaces: FromNamespaces::Same,
            kinds: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub gateway: GatewayId,
    pub name: String,
    pub hostname: Option<String>,
    pub port: u16,
    pub protocol: ProtocolType,
    pub tls_mode: Option<TlsMode>,
    pub allowed_routes: AllowedRoutes,
    pub ready: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gateway {
    pub id: GatewayId,
    pub resource: ResourceId,
    pub gateway_class: String,
    pub listeners: Vec<ListenerId>,
}

/// Owns every gateway and listener visible to a single translation pass.
/// Ids are assigned on insertion and remain stable for the arena's lifetime;
/// the arena is rebuilt fresh for each pass rather than mutated across runs.
/// `attached_routes` is the one piece of state a pass mutates in place — the
/// caller must zero it (`reset_attached_routes`) before each pass.
#[derive(Debug, Default)]
pub struct GatewayArena {
    gateways: Vec<Gateway>,
    listeners: Vec<Listener>,
    attached_routes: Vec<u32>,
}

impl GatewayArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_gateway(&mut self, resource: ResourceId, gateway_class: String) -> GatewayId {
        let id = GatewayId(self.gateways.len() as u32);
        self.gateways.push(Gateway {
            id,
            resource,
            gateway_class,
            listeners: Vec::new(),
        });
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_listener(
        &mut self,
        gateway: GatewayId,
        name: String,
        hostname: Option<String>,
        port: u16,
        protocol: ProtocolType,
        tls_mode: Option<TlsMode>,
        allowed_routes: AllowedRoutes,
        ready: bool,
    ) -> ListenerId {
        let id = ListenerId(self.listeners.len() as u32);
        self.listeners.push(Listener {
            id,
            gateway,
            name,
            hostname,
            port,
            protocol,
            tls_mode,
            allowed_routes,
            ready,
        });
        self.attached_routes.push(0);
        self.gateways[gateway.0 as usize].listeners.push(id);
        id
    }

    /// Zeroes every listener's attached-route counter. Must be called by the
    /// caller before each translation pass; the pass itself only increments.
    pub fn reset_attached_routes(&mut self) {
        self.attached_routes.iter_mut().for_each(|c| *c = 0);
    }

    pub fn increment_attached_routes(&mut self, listener: ListenerId) {
        self.attached_routes[listener.0 as usize] += 1;
    }

    pub fn attached_routes(&self, listener: ListenerId) -> u32 {
        self.attached_routes[listener.0 as usize]
    }

    pub fn gateway(&self, id: GatewayId) -> &Gateway {
        &self.gateways[id.0 as usize]
    }

    pub fn listener(&self, id: ListenerId) -> &Listener {
        &self.listeners[id.0 as usize]
    }

    pub fn listeners_of(&self, gateway: GatewayId) -> impl Iterator<Item = &Listener> {
        self.gateway(gateway)
            .listeners
            .iter()
            .map(move |id| self.listener(*id))
    }

    pub fn gateways(&self) -> impl Iterator<Item = &Gateway> {
        self.gateways.iter()
    }
}

pub fn default_scheme_for(protocol: ProtocolType) -> Option<Scheme> {
    match protocol {
        ProtocolType::Http => Some(Scheme::HTTP),
        ProtocolType::Https => Some(Scheme::HTTPS),
        _ => None,
    }
}
