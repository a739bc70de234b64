//! Translator configuration. Kept tiny and explicit, in the same spirit as
//! the small `Args`/config structs the rest of the corpus builds by hand
//! rather than via a config-file crate — there is exactly one knob that
//! varies by deployment (the controller's own name, stamped onto every
//! status condition it writes) plus a clock seam for deterministic tests.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct TranslatorConfig {
    /// Stamped onto every `RouteParentStatus` as the writing controller's
    /// identity, e.g. `"example.io/gateway-controller"`.
    pub controller_name: String,
    /// Whether Service/ServiceImport backends resolve to per-endpoint
    /// addresses (true, the default) or to cluster IPs. The snapshot this
    /// crate is handed (`BackendIndex`) is already materialized one way or
    /// the other by the caller, so this flag is carried for the embedder's
    /// own bookkeeping rather than consulted by any pipeline here.
    pub endpoint_routing: bool,
    pub clock: Box<dyn Clock>,
}

impl TranslatorConfig {
    pub fn new(controller_name: impl Into<String>) -> Self {
        Self {
            controller_name: controller_name.into(),
            endpoint_routing: true,
            clock: Box::new(SystemClock),
        }
    }

    /// Constructs a config with an injected clock, for deterministic
    /// condition timestamps under test.
    pub fn with_clock(controller_name: impl Into<String>, clock: Box<dyn Clock>) -> Self {
        Self {
            controller_name: controller_name.into(),
            endpoint_routing: true,
            clock,
        }
    }
}
