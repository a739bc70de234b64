//! Backend reference resolution: turns a rule's `BackendRef`s into
//! `DestinationSetting`s by looking them up in the resolved snapshot
//! (`BackendIndex`). A reference that can't be resolved doesn't drop out of
//! the rule — it degrades to a weight-only destination so the rule's
//! weighted split still accounts for it, per the Gateway API's "partial
//! invalid backendRefs" semantics.

use crate::input::BackendIndex;
use routeplane_core::backend::{aggregate_address_type, BackendRef, DestinationSetting};
use routeplane_core::condition::Reason;

pub struct ResolvedBackend {
    pub setting: DestinationSetting,
    pub error: Option<(Reason, String)>,
}

/// Resolves a single backend reference. `weight` defaults to 1 when the
/// reference omits it, per the Gateway API default.
pub fn resolve_one(index: &BackendIndex, backend_ref: &BackendRef) -> ResolvedBackend {
    let weight = backend_ref.weight;
    let resource = routeplane_core::resource::ResourceId::new(
        backend_ref.namespace.clone(),
        backend_ref.name.clone(),
    );

    let Some(record) = index.get(backend_ref.kind, &resource) else {
        return ResolvedBackend {
            setting: DestinationSetting::weight_only(weight),
            error: Some((
                Reason::BackendNotFound,
                format!("backend {resource} not found"),
            )),
        };
    };

    let endpoints = match backend_ref.port {
        Some(port) => record.ports.get(&port.get()).cloned().unwrap_or_default(),
        None => {
            if record.ports.len() == 1 {
                record.ports.values().next().cloned().unwrap_or_default()
            } else {
                Vec::new()
            }
        }
    };

    if endpoints.is_empty() {
        return ResolvedBackend {
            setting: DestinationSetting::weight_only(weight),
            error: Some((
                Reason::BackendNotFound,
                format!("backend {resource} has no endpoints for the requested port"),
            )),
        };
    }

    ResolvedBackend {
        setting: DestinationSetting {
            weight,
            protocol: None,
            endpoints,
            address_type: record.address_type,
            backend_tls: None,
            filters: Vec::new(),
            ip_family: record.ip_family,
            priority: None,
        },
        error: None,
    }
}

/// Drops destinations whose weight is exactly zero — they must never
/// receive traffic, so they carry no useful information forward into the IR.
pub fn normalize_weights(mut settings: Vec<DestinationSetting>) -> Vec<DestinationSetting> {
    settings.retain(|s| s.weight > 0);
    settings
}

/// Rolls up the address types of a rule's resolved destinations into one
/// value per the same aggregation rule `core::backend::aggregate_address_type`
/// uses for a single backend's endpoints.
pub fn rule_address_type(settings: &[DestinationSetting]) -> Option<routeplane_core::backend::AddressType> {
    use ahash::AHashMap;
    let mut counts: AHashMap<routeplane_core::backend::AddressType, usize> = AHashMap::default();
    for setting in settings {
        if let Some(ty) = setting.address_type {
            *counts.entry(ty).or_insert(0) += 1;
        }
    }
    aggregate_address_type(counts.into_iter())
}

/// True when every destination in a rule is invalid (no endpoints), meaning
/// the pipeline should synthesize a direct 500 response instead of a
/// forwarding action.
pub fn all_invalid(settings: &[DestinationSetting]) -> bool {
    !settings.is_empty() && settings.iter().all(|s| !s.is_valid())
}
