//! Verification state for one page load. The page load owns the only writer;
//! collaborators hold cloned readers and never mutate it.

use crate::identity::Identity;
use tokio::sync::watch;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VerificationState {
    #[default]
    Unverified,
    Verified(Identity),
}

impl VerificationState {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Verified(identity) => Some(identity),
            Self::Unverified => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct VerificationWriter {
    tx: watch::Sender<VerificationState>,
}

impl VerificationWriter {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(VerificationState::Unverified);
        Self { tx }
    }

    /// Moves to `Verified`. A page load verifies at most once; later calls
    /// keep the first identity.
    pub(crate) fn mark_verified(&self, identity: Identity) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_verified() {
                false
            } else {
                *state = VerificationState::Verified(identity);
                true
            }
        })
    }

    pub(crate) fn reader(&self) -> VerificationReader {
        VerificationReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of a page load's verification state.
#[derive(Clone, Debug)]
pub struct VerificationReader {
    rx: watch::Receiver<VerificationState>,
}

impl VerificationReader {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.rx.borrow().is_verified()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.rx.borrow().identity().cloned()
    }

    #[must_use]
    pub fn snapshot(&self) -> VerificationState {
        self.rx.borrow().clone()
    }

    /// Waits until the page load is verified and returns the identity.
    /// Returns `None` if the page load is dropped first.
    pub async fn verified(&mut self) -> Option<Identity> {
        self.rx
            .wait_for(VerificationState::is_verified)
            .await
            .ok()
            .and_then(|state| state.identity().cloned())
    }
}
