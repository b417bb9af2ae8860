//! Maps validated CLI arguments to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::gate;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let options = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        allowed_origins: options.allowed_origins,
        source_tag: options.source_tag,
        canonical_origin: options.canonical_origin,
        site_name: options.site_name,
        firebase_api_key: options.firebase_api_key,
        identity_endpoint: options.identity_endpoint,
        exchange_timeout_seconds: options.exchange_timeout_seconds,
    }))
}
