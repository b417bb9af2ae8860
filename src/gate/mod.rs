//! Access gate for a single page load.
//!
//! `Start -> Checking -> {Verified, Denied}`. The origin and token checks run
//! synchronously; the token exchange is the only suspension point and is bounded
//! by the configured timeout. Any failure denies the page load: its content is
//! replaced by a notice, its interactive elements are disabled and the host's
//! shutdown hook fires. Terminal phases are final for the page load.

pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod page;
pub mod state;
pub mod storage;

pub use config::{AllowedOriginSet, GateConfig};
pub use context::NavigationContext;
pub use error::GateError;
pub use hooks::HostHooks;
pub use page::{DenialNotice, Document, ElementId, PageSurface, Tag};
pub use state::{VerificationReader, VerificationState};
pub use storage::{MemoryStore, SessionStore, VERIFIED_MARKER_KEY};

use crate::identity::{Identity, IdentityProvider};
use secrecy::ExposeSecret;
use state::VerificationWriter;
use storage::VERIFIED_MARKER_VALUE;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    Start,
    Checking,
    Verified,
    Denied,
}

impl GatePhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Denied)
    }
}

/// Everything the gate touches for one page load: the page itself, its
/// session storage, the host hooks and the verification state.
#[derive(Debug)]
pub struct PageLoad<S, M> {
    surface: S,
    storage: M,
    hooks: HostHooks,
    verification: VerificationWriter,
    phase: GatePhase,
    denial: Option<GateError>,
}

impl<S: PageSurface, M: SessionStore> PageLoad<S, M> {
    #[must_use]
    pub fn new(surface: S, storage: M, hooks: HostHooks) -> Self {
        Self {
            surface,
            storage,
            hooks,
            verification: VerificationWriter::new(),
            phase: GatePhase::Start,
            denial: None,
        }
    }

    /// A reader for the verification state; hand it to any collaborator.
    #[must_use]
    pub fn verification(&self) -> VerificationReader {
        self.verification.reader()
    }

    #[must_use]
    pub const fn phase(&self) -> GatePhase {
        self.phase
    }

    /// The reason the page load was denied, if it was.
    #[must_use]
    pub const fn denial(&self) -> Option<GateError> {
        self.denial
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn storage(&self) -> &M {
        &self.storage
    }

    #[must_use]
    pub fn into_parts(self) -> (S, M) {
        (self.surface, self.storage)
    }

    fn verify(&mut self, identity: Identity) {
        self.verification.mark_verified(identity);
        self.storage
            .set_item(VERIFIED_MARKER_KEY, VERIFIED_MARKER_VALUE);
        self.phase = GatePhase::Verified;
    }

    fn deny(&mut self, reason: GateError, notice: &DenialNotice) {
        // Handles taken before the replacement still reach the old elements.
        let mut targets = self.surface.interactive_elements();
        let container = self.surface.replace_content(notice);
        for element in self.surface.interactive_elements() {
            if !targets.contains(&element) {
                targets.push(element);
            }
        }

        let mut disabled = 0usize;
        for element in targets {
            if !self.surface.is_within(element, container) {
                self.surface.disable(element);
                disabled += 1;
            }
        }
        debug!(disabled, "interactive elements disabled");

        self.phase = GatePhase::Denied;
        self.denial = Some(reason);

        if self.hooks.fire_denied() {
            debug!("host shutdown hook invoked");
        }
    }
}

pub struct AccessGate<P> {
    config: GateConfig,
    provider: P,
}

impl<P: IdentityProvider> AccessGate<P> {
    #[must_use]
    pub fn new(config: GateConfig, provider: P) -> Self {
        Self { config, provider }
    }

    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Accept the navigation when the referrer origin is allowed OR the source
    /// tag matches. A forged `source` passes when the referrer is stripped.
    #[must_use]
    pub fn origin_accepted(&self, context: &NavigationContext) -> bool {
        self.config
            .allowed_origins
            .contains(context.referrer_origin())
            || context.source_tag() == Some(self.config.source_tag.as_str())
    }

    /// Synchronous checks: origin first, then token presence.
    ///
    /// # Errors
    /// `OriginRejected` or `TokenMissing`, whichever fails first.
    pub fn check(&self, context: &NavigationContext) -> Result<(), GateError> {
        if !self.origin_accepted(context) {
            return Err(GateError::OriginRejected);
        }

        match context.token() {
            Some(token) if !token.expose_secret().is_empty() => Ok(()),
            _ => Err(GateError::TokenMissing),
        }
    }

    async fn exchange(&self, context: &NavigationContext) -> Result<Identity, GateError> {
        let token = context.token().ok_or(GateError::TokenMissing)?;

        match timeout(
            self.config.exchange_timeout,
            self.provider.exchange(token.expose_secret()),
        )
        .await
        {
            Ok(Ok(identity)) => Ok(identity),
            Ok(Err(e)) => {
                error!("Token verification failed: {e}");
                Err(GateError::TokenInvalid)
            }
            Err(_) => {
                error!(
                    "Token verification timed out after {:?}",
                    self.config.exchange_timeout
                );
                Err(GateError::TokenInvalid)
            }
        }
    }

    /// Runs the gate for the page load. Resolves to `true` when verified.
    /// A page load that already reached a decision returns it unchanged.
    #[instrument(skip_all)]
    pub async fn run<S, M>(&self, context: &NavigationContext, page: &mut PageLoad<S, M>) -> bool
    where
        S: PageSurface,
        M: SessionStore,
    {
        if page.phase.is_terminal() {
            warn!(phase = ?page.phase, "gate already decided for this page load");
            return page.phase == GatePhase::Verified;
        }

        page.phase = GatePhase::Checking;
        debug!(
            source = ?context.source_tag(),
            referrer = ?context.referrer_origin(),
            "checking navigation"
        );

        let outcome = match self.check(context) {
            Ok(()) => self.exchange(context).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(identity) => {
                info!(user = identity.display_name(), "User authenticated");
                page.verify(identity);
                true
            }
            Err(reason) => {
                warn!(%reason, "access denied");
                let notice = DenialNotice::new(reason.to_string(), &self.config);
                page.deny(reason, &notice);
                false
            }
        }
    }
}

/// Page-ready wiring: runs the gate once, then lets the host continue its
/// initialization through the `on_verified` hook.
pub async fn bootstrap<P, S, M>(
    gate: &AccessGate<P>,
    context: &NavigationContext,
    page: &mut PageLoad<S, M>,
) -> bool
where
    P: IdentityProvider,
    S: PageSurface,
    M: SessionStore,
{
    let decided = page.phase.is_terminal();
    let verified = gate.run(context, page).await;

    if decided {
        return verified;
    }

    if verified {
        info!("Authentication verified, application can continue");
        page.hooks.fire_verified();
    } else {
        error!("Authentication failed, application disabled");
    }

    verified
}
