//! # NextStep Gate (cross-site access gate)
//!
//! `nextstep-gate` decides whether a page load of the college finder is allowed
//! to proceed. A navigation is accepted when it arrives from the trusted NextStep
//! origin (or carries the expected `source` tag) and presents a token the
//! identity provider exchanges for an identity.
//!
//! ## Flow
//!
//! 1. **Origin:** the referrer origin must be in the allowed set, *or* the `source`
//!    query parameter must equal the configured tag. This is an OR: a forged
//!    `source` passes when the browser strips the referrer. Known weakness, kept.
//! 2. **Token:** the `token` query parameter must be present and non-empty.
//! 3. **Exchange:** the token is exchanged with the identity provider, bounded by
//!    a timeout. Any failure is reported as an invalid token.
//!
//! A denied page load has its content replaced by an access-denied notice, every
//! interactive element disabled and the host's shutdown hook fired. Decisions are
//! final for the page load.

pub mod api;
pub mod cli;
pub mod gate;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
