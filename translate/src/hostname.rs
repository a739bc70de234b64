//! Hostname (and SNI) intersection between a route's requested hostnames and
//! the hostname a listener was configured with. Gateway API wildcard rules:
//! a hostname is either precise (`www.example.com`) or a wildcard with
//! exactly one leading label (`*.example.com`), and a wildcard matches any
//! precise hostname sharing its remaining labels.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind<'a> {
    Precise(&'a str),
    Wildcard(&'a str),
}

fn classify(hostname: &str) -> Kind<'_> {
    match hostname.strip_prefix("*.") {
        Some(rest) => Kind::Wildcard(rest),
        None => Kind::Precise(hostname),
    }
}

/// True if `candidate` is covered by `pattern` (itself precise or wildcard).
fn covers(pattern: &str, candidate: &str) -> bool {
    match (classify(pattern), classify(candidate)) {
        (Kind::Precise(p), Kind::Precise(c)) => p == c,
        (Kind::Precise(_), Kind::Wildcard(_)) => false,
        (Kind::Wildcard(p_suffix), Kind::Precise(c)) => {
            c != p_suffix && c.ends_with(p_suffix) && c[..c.len() - p_suffix.len()].ends_with('.')
        }
        (Kind::Wildcard(p_suffix), Kind::Wildcard(c_suffix)) => p_suffix == c_suffix,
    }
}

/// Picks the more specific of two overlapping hostnames (the one with more
/// labels / without a wildcard), per the Gateway API's intersection rule.
fn more_specific<'a>(a: &'a str, b: &'a str) -> &'a str {
    match (classify(a), classify(b)) {
        (Kind::Precise(_), Kind::Wildcard(_)) => a,
        (Kind::Wildcard(_), Kind::Precise(_)) => b,
        _ => {
            if a.len() >= b.len() {
                a
            } else {
                b
            }
        }
    }
}

/// Intersects a route's requested hostnames against a listener's single
/// hostname (absent meaning "accepts any"). An empty `route_hostnames` input
/// means the route itself places no constraint, so the listener's own
/// hostname (or wildcard-all, if the listener has none either) is returned.
///
/// Returns the intersected hostname set, most-specific first. An empty
/// result means no overlap: the caller should reject attachment with
/// `NoMatchingListenerHostname`.
pub fn intersect(route_hostnames: &[String], listener_hostname: Option<&str>) -> Vec<String> {
    let listener_hostname = listener_hostname.unwrap_or("*");

    if route_hostnames.is_empty() {
        return vec![listener_hostname.to_string()];
    }

    let mut out = Vec::new();
    for route_host in route_hostnames {
        if listener_hostname == "*" {
            out.push(route_host.clone());
            continue;
        }
        if covers(listener_hostname, route_host) {
            out.push(route_host.clone());
        } else if covers(route_host, listener_hostname) {
            out.push(listener_hostname.to_string());
        } else if route_host == listener_hostname {
            out.push(route_host.clone());
        }
    }

    out.sort_by(|a, b| {
        if a == b {
            std::cmp::Ordering::Equal
        } else if more_specific(a, b) == a.as_str() {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    });
    out
}
