//! HTTPRoute conversion: matched rules, with their backends resolved and
//! their filters folded into an IR action, expanded once per match and once
//! per intersected hostname, then appended to the owning listener's route
//! list.

use crate::backend_resolver::{all_invalid, normalize_weights, resolve_one, rule_address_type};
use crate::input::TranslationInput;
use routeplane_core::ir::{
    ir_route_name, DirectResponse, IrHttpRoute, IrHttpRule, Mirror, Redirect, RewriteFilters,
    RouteAction, TrafficFeatures, WeightedDestination,
};
use routeplane_core::resource::GroupKindName;
use routeplane_core::route::{HttpRouteFilter, HttpRouteRule, Route, RouteRules};
use routeplane_core::routes::{HttpRouteMatch, RequestMirrorFilter};

/// Converts every rule of an HTTPRoute into IR, resolving backends against
/// `input.backends`. Rules whose destinations are all invalid get a
/// synthetic 500 `DirectResponse` instead of a forwarding action. Each rule
/// expands into one IR route per match (or one "matches everything" route
/// when the rule declares none) times one per intersected hostname.
pub fn convert(
    input: &TranslationInput,
    route: &Route,
    hostnames: &[String],
    listener_port: u16,
) -> Option<IrHttpRoute> {
    let RouteRules::Http(rules) = &route.rules else {
        return None;
    };

    let route_id = route.group_kind_name();
    let route_id_str = format!("{}/{}", route.resource.namespace, route.resource.name);
    let mut ir_rules = Vec::new();
    let mut features = Vec::with_capacity(rules.len());

    for (idx, rule) in rules.iter().enumerate() {
        let (action, rule_features) = convert_rule(input, rule, listener_port);
        features.push(rule_features);

        let matches: Vec<(Option<usize>, HttpRouteMatch)> = if rule.matches.is_empty() {
            vec![(None, HttpRouteMatch::default())]
        } else {
            rule.matches
                .iter()
                .enumerate()
                .map(|(i, m)| (Some(i), m.clone()))
                .collect()
        };

        for (match_idx, m) in matches {
            for hostname in hostnames {
                ir_rules.push(IrHttpRule {
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

    Some(IrHttpRoute {
        rules: ir_rules,
        features,
    })
}

fn convert_rule(
    input: &TranslationInput,
    rule: &HttpRouteRule,
    listener_port: u16,
) -> (RouteAction, TrafficFeatures) {
    let backend_request_millis = rule.timeouts.as_ref().and_then(|t| t.backend_request_millis);
    let request_millis = rule.timeouts.as_ref().and_then(|t| t.request_millis);
    let features = TrafficFeatures {
        // BackendRequest overrides Request when both are set; see the open
        // question in the spec about whether this precedence is intended.
        request_timeout_millis: backend_request_millis.or(request_millis),
        backend_request_timeout_millis: backend_request_millis,
    };

    if let Some(mut redirect) = rule.filters.iter().find_map(|f| match f {
        HttpRouteFilter::RequestRedirect(r) => Some(r.clone()),
        _ => None,
    }) {
        if redirect.port.is_none() {
            redirect.port = Some(redirect_port(&redirect.scheme, listener_port));
        }
        return (RouteAction::Redirect(Redirect { filter: redirect }), features);
    }

    let resolved: Vec<_> = rule
        .backends
        .iter()
        .map(|backend_ref| (backend_ref, resolve_one(&input.backends, backend_ref)))
        .collect();

    let settings = normalize_weights(resolved.iter().map(|(_, r)| r.setting.clone()).collect());

    if all_invalid(&settings) {
        return (
            RouteAction::DirectResponse(DirectResponse {
                status: 500,
                body: None,
            }),
            features,
        );
    }

    let _ = rule_address_type(&settings);

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

    let mirrors = rule
        .filters
        .iter()
        .filter_map(|f| match f {
            HttpRouteFilter::RequestMirror(m) => Some(convert_mirror(input, m)),
            _ => None,
        })
        .collect();

    let rewrite = RewriteFilters {
        request_headers: rule.filters.iter().find_map(|f| match f {
            HttpRouteFilter::RequestHeaderModifier(h) => Some(h.clone()),
            _ => None,
        }),
        response_headers: rule.filters.iter().find_map(|f| match f {
            HttpRouteFilter::ResponseHeaderModifier(h) => Some(h.clone()),
            _ => None,
        }),
        url_rewrite: rule.filters.iter().find_map(|f| match f {
            HttpRouteFilter::UrlRewrite(u) => Some(u.clone()),
            _ => None,
        }),
    };

    (
        RouteAction::Forward {
            destinations,
            mirrors,
            rewrite,
        },
        features,
    )
}

/// A redirect's port defaults from its scheme (http=80, https=443) and
/// otherwise falls back to the attaching listener's own port.
fn redirect_port(scheme: &Option<routeplane_core::routes::Scheme>, listener_port: u16) -> std::num::NonZeroU16 {
    use std::num::NonZeroU16;
    let port = match scheme.as_ref().map(|s| s.as_str()) {
        Some("http") => 80,
        Some("https") => 443,
        _ => listener_port,
    };
    NonZeroU16::new(port).unwrap_or(NonZeroU16::new(80).unwrap())
}

fn convert_mirror(input: &TranslationInput, filter: &RequestMirrorFilter) -> Mirror {
    let backend_ref = routeplane_core::backend::BackendRef {
        kind: routeplane_core::backend::BackendKind::Service,
        name: filter.backend.name.to_string(),
        namespace: String::new(),
        port: None,
        weight: 1,
        filters: Vec::new(),
    };
    let resolved = resolve_one(&input.backends, &backend_ref);
    Mirror {
        destination: WeightedDestination {
            setting: resolved.setting,
            backend: filter.backend.clone(),
        },
        percent: filter.percent.as_ref().map(|r| (r.numerator, r.denominator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeplane_core::backend::BackendKind;
    use routeplane_core::resource::ResourceId;

    fn basic_route(rules: Vec<HttpRouteRule>) -> Route {
        Route {
            resource: ResourceId::new("default", "web"),
            generation: 1,
            hostnames: vec![],
            parent_refs: vec![],
            rules: RouteRules::Http(rules),
        }
    }

    fn backend_ref(name: &str, weight: u32) -> routeplane_core::backend::BackendRef {
        routeplane_core::backend::BackendRef {
            kind: BackendKind::Service,
            name: name.to_string(),
            namespace: "default".to_string(),
            port: None,
            weight,
            filters: Vec::new(),
        }
    }

    #[test]
    fn rule_with_no_resolvable_backends_becomes_direct_response() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![HttpRouteMatch::default()],
            filters: vec![],
            backends: vec![backend_ref("missing", 1)],
            timeouts: None,
        }]);
        let hostnames = vec!["*.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames, 80).unwrap();
        assert_eq!(ir.rules.len(), 1);
        assert!(matches!(ir.rules[0].action, RouteAction::DirectResponse(_)));
    }

    #[test]
    fn redirect_filter_short_circuits_backend_resolution() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![HttpRouteMatch::default()],
            filters: vec![HttpRouteFilter::RequestRedirect(
                routeplane_core::routes::RequestRedirectFilter {
                    scheme: None,
                    host: Some("example.com".into()),
                    path: None,
                    port: None,
                    status: None,
                },
            )],
            backends: vec![],
            timeouts: None,
        }]);
        let hostnames = vec!["*.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames, 80).unwrap();
        assert!(matches!(ir.rules[0].action, RouteAction::Redirect(_)));
    }

    #[test]
    fn redirect_without_explicit_port_derives_from_scheme() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![HttpRouteMatch::default()],
            filters: vec![HttpRouteFilter::RequestRedirect(
                routeplane_core::routes::RequestRedirectFilter {
                    scheme: Some(routeplane_core::routes::Scheme::HTTPS),
                    host: None,
                    path: None,
                    port: None,
                    status: None,
                },
            )],
            backends: vec![],
            timeouts: None,
        }]);
        let hostnames = vec!["*.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames, 8443).unwrap();
        let RouteAction::Redirect(redirect) = &ir.rules[0].action else {
            panic!("expected redirect action");
        };
        assert_eq!(redirect.filter.port.unwrap().get(), 443);
    }

    #[test]
    fn redirect_without_scheme_or_port_falls_back_to_listener_port() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![HttpRouteMatch::default()],
            filters: vec![HttpRouteFilter::RequestRedirect(
                routeplane_core::routes::RequestRedirectFilter {
                    scheme: None,
                    host: None,
                    path: None,
                    port: None,
                    status: None,
                },
            )],
            backends: vec![],
            timeouts: None,
        }]);
        let hostnames = vec!["*.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames, 8080).unwrap();
        let RouteAction::Redirect(redirect) = &ir.rules[0].action else {
            panic!("expected redirect action");
        };
        assert_eq!(redirect.filter.port.unwrap().get(), 8080);
    }

    #[test]
    fn route_name_encodes_hostname_dots_as_underscores() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![routeplane_core::routes::HttpRouteMatch {
                path: Some(routeplane_core::routes::PathMatch::Exact("/a".into())),
                ..Default::default()
            }],
            filters: vec![],
            backends: vec![],
            timeouts: None,
        }]);
        let hostnames = vec!["foo.example.com".to_string()];
        let ir = convert(&input, &route, &hostnames, 80).unwrap();
        assert_eq!(ir.rules[0].name, "default/web/0/0/foo_example_com");
    }

    #[test]
    fn rule_with_no_matches_expands_to_single_catch_all_route() {
        let input = TranslationInput::default();
        let route = basic_route(vec![HttpRouteRule {
            matches: vec![],
            filters: vec![],
            backends: vec![],
            timeouts: None,
        }]);
        let hostnames = vec!["*".to_string()];
        let ir = convert(&input, &route, &hostnames, 80).unwrap();
        assert_eq!(ir.rules.len(), 1);
        assert_eq!(ir.rules[0].name, "default/web/0//*");
    }
}
