//! Status condition writer: folds a parent's attachment outcome plus
//! whether the route's backends all resolved cleanly into the `Accepted` /
//! `ResolvedRefs` condition pair required per `parentRef`.

use crate::attachment::ParentAttachment;
use chrono::{DateTime, Utc};
use routeplane_core::condition::{Condition, Reason};
use routeplane_core::route::{ParentReference, RouteParentStatus};

pub fn parent_status(
    parent_ref: ParentReference,
    controller_name: &str,
    outcome: &ParentAttachment,
    refs_resolved: bool,
    unresolved: Option<(Reason, &str)>,
    observed_generation: i64,
    now: DateTime<Utc>,
) -> RouteParentStatus {
    let mut conditions = Vec::with_capacity(2);

    match outcome {
        ParentAttachment::Attached(_) => {
            conditions.push(Condition::accepted(observed_generation, now));
            if refs_resolved {
                conditions.push(Condition::resolved_refs(observed_generation, now));
            } else {
                let (reason, message) =
                    unresolved.unwrap_or((Reason::BackendNotFound, "one or more backendRefs could not be resolved"));
                conditions.push(Condition::refs_not_resolved(reason, message.to_string(), observed_generation, now));
            }
        }
        ParentAttachment::Rejected { reason, message } => {
            conditions.push(Condition::not_accepted(*reason, message.clone(), observed_generation, now));
        }
    }

    RouteParentStatus {
        parent_ref,
        controller_name: controller_name.to_string(),
        conditions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachedListener;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn parent_ref() -> ParentReference {
        ParentReference {
            group: None,
            kind: None,
            namespace: None,
            name: "gw".into(),
            section_name: None,
            port: None,
        }
    }

    #[test]
    fn attached_and_resolved_yields_two_true_conditions() {
        let outcome = ParentAttachment::Attached(vec![AttachedListener {
            listener: routeplane_core::gateway::ListenerId(0),
            hostnames: vec!["example.com".into()],
        }]);
        let status = parent_status(parent_ref(), "example.io/controller", &outcome, true, None, 1, now());
        assert_eq!(status.conditions.len(), 2);
        assert!(status
            .conditions
            .iter()
            .all(|c| c.status == routeplane_core::condition::ConditionStatus::True));
    }

    #[test]
    fn rejected_attachment_yields_single_false_condition() {
        let outcome = ParentAttachment::Rejected {
            reason: Reason::NoMatchingParent,
            message: "no such gateway".into(),
        };
        let status = parent_status(parent_ref(), "example.io/controller", &outcome, true, None, 1, now());
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, routeplane_core::condition::ConditionStatus::False);
    }
}
