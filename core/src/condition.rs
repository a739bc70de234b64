//! Status condition types written by the route-translator passes. These
//! mirror `metav1.Condition` closely enough to be serialized into one
//! directly, but carry no `kube`/`k8s-openapi` dependency of their own —
//! that conversion belongs to whatever ingests the translator's output.

use chrono::{DateTime, Utc};
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionType {
    Accepted,
    ResolvedRefs,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::ResolvedRefs => "ResolvedRefs",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        }
    }
}

/// The well-known reasons the Gateway API spec defines for `Accepted` and
/// `ResolvedRefs` conditions, plus the translator's own synthetic reasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    Accepted,
    NotAllowedByListeners,
    NoMatchingListenerHostname,
    NoMatchingParent,
    UnsupportedValue,
    InvalidKind,
    RefNotPermitted,
    BackendNotFound,
    InvalidBackendFilter,
    InvalidRule,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::NotAllowedByListeners => "NotAllowedByListeners",
            Self::NoMatchingListenerHostname => "NoMatchingListenerHostname",
            Self::NoMatchingParent => "NoMatchingParent",
            Self::UnsupportedValue => "UnsupportedValue",
            Self::InvalidKind => "InvalidKind",
            Self::RefNotPermitted => "RefNotPermitted",
            Self::BackendNotFound => "BackendNotFound",
            Self::InvalidBackendFilter => "InvalidBackendFilter",
            Self::InvalidRule => "InvalidRule",
        }
    }
}

/// A single status condition attached to a route's `parents[].conditions`
/// entry. `observed_generation` lets a consumer detect a stale status
/// written against an older spec revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionType,
    pub status: ConditionStatus,
    pub reason: Reason,
    pub message: Cow<'static, str>,
    pub observed_generation: i64,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    pub fn accepted(observed_generation: i64, now: DateTime<Utc>) -> Self {
        Self {
            kind: ConditionType::Accepted,
            status: ConditionStatus::True,
            reason: Reason::Accepted,
            message: Cow::Borrowed("Route is accepted"),
            observed_generation,
            last_transition_time: now,
        }
    }

    pub fn not_accepted(
        reason: Reason,
        message: impl Into<Cow<'static, str>>,
        observed_generation: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: ConditionType::Accepted,
            status: ConditionStatus::False,
            reason,
            message: message.into(),
            observed_generation,
            last_transition_time: now,
        }
    }

    pub fn resolved_refs(observed_generation: i64, now: DateTime<Utc>) -> Self {
        Self {
            kind: ConditionType::ResolvedRefs,
            status: ConditionStatus::True,
            reason: Reason::Accepted,
            message: Cow::Borrowed("All references resolved"),
            observed_generation,
            last_transition_time: now,
        }
    }

    pub fn refs_not_resolved(
        reason: Reason,
        message: impl Into<Cow<'static, str>>,
        observed_generation: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: ConditionType::ResolvedRefs,
            status: ConditionStatus::False,
            reason,
            message: message.into(),
            observed_generation,
            last_transition_time: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_condition_is_true() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let cond = Condition::accepted(3, now);
        assert_eq!(cond.status, ConditionStatus::True);
        assert_eq!(cond.reason.as_str(), "Accepted");
        assert_eq!(cond.observed_generation, 3);
    }

    #[test]
    fn not_accepted_carries_reason() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let cond = Condition::not_accepted(Reason::NoMatchingParent, "no matching parent", 1, now);
        assert_eq!(cond.status, ConditionStatus::False);
        assert_eq!(cond.kind, ConditionType::Accepted);
    }
}
