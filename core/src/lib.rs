#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod condition;
pub mod gateway;
pub mod ir;
pub mod resource;
pub mod route;
pub mod routes;

pub use condition::{Condition, ConditionStatus, ConditionType, Reason};
pub use resource::{GroupKindName, GroupKindNamespaceName, ResourceId};
