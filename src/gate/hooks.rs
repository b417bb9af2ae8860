//! Cooperative hooks registered by the host page.
//!
//! `on_denied` is invoked by the gate when the page load is denied, so the host
//! can halt its own background work. `on_verified` is invoked by the page-ready
//! bootstrap once verification succeeds, to continue normal initialization.

use std::fmt;

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct HostHooks {
    on_denied: Option<Hook>,
    on_verified: Option<Hook>,
}

impl HostHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_denied(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_denied = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_verified(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_verified = Some(Box::new(hook));
        self
    }

    /// Returns whether a hook was registered.
    pub(crate) fn fire_denied(&self) -> bool {
        self.on_denied.as_ref().map(|hook| hook()).is_some()
    }

    pub(crate) fn fire_verified(&self) -> bool {
        self.on_verified.as_ref().map(|hook| hook()).is_some()
    }
}

impl fmt::Debug for HostHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHooks")
            .field("on_denied", &self.on_denied.is_some())
            .field("on_verified", &self.on_verified.is_some())
            .finish()
    }
}
