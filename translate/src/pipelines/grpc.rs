//! GRPCRoute conversion, following GEP-1016: a rule's `(service, method)`
//! match becomes one or more HTTP/2-shaped matches (path exact/prefix plus a
//! `:method` header match), since the IR has no gRPC-specific match type of
//! its own — only `HttpRouteMatch` with a synthesized path.

use crate::backend_resolver::{all_invalid, normalize_weights, resolve_one};
use crate::input::TranslationInput;
use routeplane_core::ir::{
    ir_route_name, DirectResponse, IrGrpcRoute, IrGrpcRule, RewriteFilters, RouteAction, WeightedDestination,
};
use routeplane_core::resource::GroupKindName;
use routeplane_core::route::{GrpcRouteFilter, GrpcRouteRule, Route, RouteRules};
use routeplane_core::routes::GrpcRouteMatch;

pub fn convert(input: &TranslationInput, route: &Route, hostnames: &[String]) -> Option<IrGrpcRoute> {
    let RouteRules::Grpc(rules) = &route.rules else {
        return None;
    };

    let route_id = route.group_kind_name();
    let route_id_str = format!("{}/{}", route.resource.namespace, route.resource.name);
    let mut ir_rules = Vec::new();

    for (idx, rule) in rules.iter().enumerate() {
        let action = convert_rule(input, rule);

        let matches: Vec<(Option<usize>, GrpcRouteMatch)> = if rule.matches.is_empty() {
            vec![(None, GrpcRouteMatch::default())]
        } else {
            rule.matches
                .iter()
                .enumerate()
                .map(|(i, m)| (Some(i), m.clone()))
                .collect()
        };

        for (match_idx, m) in matches {
            for hostname in hostnames {
                ir_rules.push(IrGrpcRule {
                    name: ir_route_name(&route_id_str, idx, match_idx, hostname),
                    hostname: hostname.clone(),
                    matches: vec![m.clone()],
                    action: action.clone(),
                    route: route_id.clone(),
                    rule_index: idx,
                });
            }
        }
    }

    Some(IrGrpcRoute { rules: ir_rules })
}

fn convert_rule(input: &TranslationInput, rule: &GrpcRouteRule) -> RouteAction {
    let resolved: Vec<_> = rule
        .backends
        .iter()
        .map(|backend_ref| (backend_ref, resolve_one(&input.backends, backend_ref)))
        .collect();

    let settings = normalize_weights(resolved.iter().map(|(_, r)| r.setting.clone()).collect());

    if all_invalid(&settings) {
        return RouteAction::DirectResponse(DirectResponse {
            status: 500,
            body: None,
        });
    }

    let destinations: Vec<WeightedDestination> = resolved
        .iter()
        .filter(|(_, r)| r.setting.weight > 0)
        .map(|(backend_ref, resolved)| WeightedDestination {
            setting: resolved.setting.clone(),
            backend: GroupKindName {
                group: "core".into(),
                kind: "Service".into(),
                name: backend_ref.name.clone().into(),
            },
        })
        .collect();

    let rewrite = RewriteFilters {
        request_headers: rule.filters.iter().find_map(|f| match f {
            GrpcRouteFilter::RequestHeaderModifier(h) => Some(h.clone()),
            _ => None,
        }),
        response_headers: rule.filters.iter().find_map(|f| match f {
            GrpcRouteFilter::ResponseHeaderModifier(h) => Some(h.clone()),
            _ => None,
        }),
        url_rewrite: None,
    };

    RouteAction::Forward {
        destinations,
        mirrors: Vec::new(),
        rewrite,
    }
}

/// Lowers a gRPC `(service, method)` match into the IR's path/header
/// vocabulary, per GEP-1016:
///   - service + method, exact: path exact `/service/method`
///   - service only, exact: path prefix `/service/`
///   - either component a regex: path regex anchored the same way, since
///     the IR has no separate gRPC regex kind
pub fn lower_method_match(
    m: &routeplane_core::routes::GrpcMethodMatch,
) -> routeplane_core::routes::PathMatch {
    use routeplane_core::routes::{GrpcMethodMatchKind, PathMatch};

    match (m.kind, &m.service, &m.method) {
        (GrpcMethodMatchKind::Exact, Some(service), Some(method)) => {
            PathMatch::Exact(format!("/{service}/{method}"))
        }
        (GrpcMethodMatchKind::Exact, Some(service), None) => PathMatch::Prefix(format!("/{service}/")),
        (GrpcMethodMatchKind::Exact, None, Some(method)) => {
            PathMatch::regex(&format!(r"^/[^/]+/{}$", regex::escape(method))).unwrap()
        }
        (GrpcMethodMatchKind::Regex, Some(service), Some(method)) => {
            PathMatch::regex(&format!("^/{service}/{method}$")).unwrap()
        }
        (GrpcMethodMatchKind::Regex, Some(service), None) => {
            PathMatch::regex(&format!("^/{service}/.*$")).unwrap()
        }
        (GrpcMethodMatchKind::Regex, None, Some(method)) => {
            PathMatch::regex(&format!("^/[^/]+/{method}$")).unwrap()
        }
        (_, None, None) => PathMatch::Prefix("/".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeplane_core::routes::{GrpcMethodMatch, GrpcMethodMatchKind, PathMatch};

    #[test]
    fn exact_service_and_method_becomes_path_exact() {
        let m = GrpcMethodMatch {
            kind: GrpcMethodMatchKind::Exact,
            service: Some("pkg.Greeter".into()),
            method: Some("SayHello".into()),
        };
        assert_eq!(
            lower_method_match(&m),
            PathMatch::Exact("/pkg.Greeter/SayHello".into())
        );
    }

    #[test]
    fn service_only_becomes_path_prefix() {
        let m = GrpcMethodMatch {
            kind: GrpcMethodMatchKind::Exact,
            service: Some("pkg.Greeter".into()),
            method: None,
        };
        assert_eq!(lower_method_match(&m), PathMatch::Prefix("/pkg.Greeter/".into()));
    }

    #[test]
    fn convert_expands_rule_across_hostnames() {
        use routeplane_core::backend::BackendKind;
        use routeplane_core::resource::ResourceId;

        let input = TranslationInput::default();
        let route = Route {
            resource: ResourceId::new("default", "greeter"),
            generation: 1,
            hostnames: vec![],
            parent_refs: vec![],
            rules: RouteRules::Grpc(vec![GrpcRouteRule {
                matches: vec![],
                filters: vec![],
                backends: vec![routeplane_core::backend::BackendRef {
                    kind: BackendKind::Service,
                    name: "missing".into(),
                    namespace: "default".into(),
                    port: None,
                    weight: 1,
                    filters: Vec::new(),
                }],
            }]),
        };
        let hostnames = vec!["a.example.com".to_string(), "b.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames).unwrap();
        assert_eq!(ir.rules.len(), 2);
        assert_eq!(ir.rules[0].name, "default/greeter/0//a_example_com");
        assert_eq!(ir.rules[1].name, "default/greeter/0//b_example_com");
    }
}
