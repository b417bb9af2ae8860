use crate::gate::config::{DEFAULT_SITE_NAME, DEFAULT_SOURCE_TAG, DEFAULT_TRUSTED_ORIGIN};
use crate::identity::firebase::DEFAULT_ENDPOINT;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ALLOWED_ORIGIN: &str = "allowed-origin";
pub const ARG_SOURCE_TAG: &str = "source-tag";
pub const ARG_CANONICAL_ORIGIN: &str = "canonical-origin";
pub const ARG_SITE_NAME: &str = "site-name";
pub const ARG_FIREBASE_API_KEY: &str = "firebase-api-key";
pub const ARG_IDENTITY_ENDPOINT: &str = "identity-endpoint";
pub const ARG_EXCHANGE_TIMEOUT: &str = "exchange-timeout";

pub fn with_args(command: Command) -> Command {
    let command = with_origin_args(command);
    with_identity_args(command)
}

fn with_origin_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ALLOWED_ORIGIN)
                .long(ARG_ALLOWED_ORIGIN)
                .help("Origin allowed as referrer (repeatable or comma separated)")
                .env("NEXTSTEP_ALLOWED_ORIGINS")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .default_value(DEFAULT_TRUSTED_ORIGIN),
        )
        .arg(
            Arg::new(ARG_SOURCE_TAG)
                .long(ARG_SOURCE_TAG)
                .help("Value of the `source` query parameter accepted in place of a trusted referrer")
                .env("NEXTSTEP_SOURCE_TAG")
                .default_value(DEFAULT_SOURCE_TAG),
        )
        .arg(
            Arg::new(ARG_CANONICAL_ORIGIN)
                .long(ARG_CANONICAL_ORIGIN)
                .help("Site linked from the access denied page")
                .env("NEXTSTEP_CANONICAL_ORIGIN")
                .default_value(DEFAULT_TRUSTED_ORIGIN),
        )
        .arg(
            Arg::new(ARG_SITE_NAME)
                .long(ARG_SITE_NAME)
                .help("Site name shown on the access denied page")
                .env("NEXTSTEP_SITE_NAME")
                .default_value(DEFAULT_SITE_NAME),
        )
}

fn with_identity_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FIREBASE_API_KEY)
                .long(ARG_FIREBASE_API_KEY)
                .help("Firebase web API key used for token exchange")
                .env("NEXTSTEP_FIREBASE_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_ENDPOINT)
                .long(ARG_IDENTITY_ENDPOINT)
                .help("Identity Toolkit base URL")
                .env("NEXTSTEP_IDENTITY_ENDPOINT")
                .default_value(DEFAULT_ENDPOINT),
        )
        .arg(
            Arg::new(ARG_EXCHANGE_TIMEOUT)
                .long(ARG_EXCHANGE_TIMEOUT)
                .help("Token exchange timeout in seconds")
                .env("NEXTSTEP_EXCHANGE_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub allowed_origins: Vec<String>,
    pub source_tag: String,
    pub canonical_origin: String,
    pub site_name: String,
    pub firebase_api_key: SecretString,
    pub identity_endpoint: String,
    pub exchange_timeout_seconds: u64,
}

impl Options {
    /// Read gate options from validated matches.
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let allowed_origins = matches
            .get_many::<String>(ARG_ALLOWED_ORIGIN)
            .map(|values| {
                values
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let string = |name: &str| -> Result<String> {
            matches
                .get_one::<String>(name)
                .cloned()
                .with_context(|| format!("missing required argument: --{name}"))
        };

        Ok(Self {
            allowed_origins,
            source_tag: string(ARG_SOURCE_TAG)?,
            canonical_origin: string(ARG_CANONICAL_ORIGIN)?,
            site_name: string(ARG_SITE_NAME)?,
            firebase_api_key: SecretString::from(string(ARG_FIREBASE_API_KEY)?),
            identity_endpoint: string(ARG_IDENTITY_ENDPOINT)?,
            exchange_timeout_seconds: matches
                .get_one::<u64>(ARG_EXCHANGE_TIMEOUT)
                .copied()
                .unwrap_or(10),
        })
    }
}
