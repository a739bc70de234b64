//! TLSRoute conversion (passthrough only — TLS termination/policy
//! translation is out of scope). A route's SNI hostnames were already
//! intersected against the listener during attachment; this stage just
//! resolves backends.

use crate::backend_resolver::resolve_one;
use crate::input::TranslationInput;
use routeplane_core::ir::{IrTlsRoute, TlsInspector, WeightedDestination};
use routeplane_core::resource::GroupKindName;
use routeplane_core::route::{Route, RouteRules};

pub fn convert(input: &TranslationInput, route: &Route, sni_hostnames: Vec<String>) -> Option<IrTlsRoute> {
    let RouteRules::Tls(rules) = &route.rules else {
        return None;
    };

    let route_id = route.group_kind_name();
    let destinations = rules
        .iter()
        .flat_map(|rule| rule.backends.iter())
        .map(|backend_ref| (backend_ref, resolve_one(&input.backends, backend_ref)))
        .filter(|(_, resolved)| resolved.setting.weight > 0)
        .map(|(backend_ref, resolved)| WeightedDestination {
            setting: resolved.setting,
            backend: GroupKindName {
                group: "core".into(),
                kind: "Service".into(),
                name: backend_ref.name.clone().into(),
            },
        })
        .collect();

    Some(IrTlsRoute {
        inspector: TlsInspector { sni_hostnames },
        destinations,
        route: route_id,
    })
}
