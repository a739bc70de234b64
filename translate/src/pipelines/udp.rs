//! UDPRoute conversion: identical shape to TCPRoute, kept as its own module
//! since the two kinds attach to distinct listener protocols and may grow
//! protocol-specific handling independently.

use crate::backend_resolver::resolve_one;
use crate::input::TranslationInput;
use routeplane_core::ir::{IrUdpRoute, WeightedDestination};
use routeplane_core::resource::GroupKindName;
use routeplane_core::route::{Route, RouteRules};

pub fn convert(input: &TranslationInput, route: &Route) -> Option<IrUdpRoute> {
    let RouteRules::Udp(rules) = &route.rules else {
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

    Some(IrUdpRoute {
        destinations,
        route: route_id,
    })
}
