use crate::{
    api::{self, AppState},
    cli::telemetry,
    gate::{AccessGate, AllowedOriginSet, GateConfig},
    identity::FirebaseProvider,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub source_tag: String,
    pub canonical_origin: String,
    pub site_name: String,
    pub firebase_api_key: SecretString,
    pub identity_endpoint: String,
    pub exchange_timeout_seconds: u64,
}

impl Args {
    /// Build the gate configuration from the parsed arguments.
    /// # Errors
    /// Returns an error if an origin is not a valid URL.
    pub fn gate_config(&self) -> Result<GateConfig> {
        let allowed = AllowedOriginSet::parse(&self.allowed_origins)
            .context("Invalid allowed origin")?;
        let canonical =
            Url::parse(&self.canonical_origin).context("Invalid canonical origin")?;

        Ok(GateConfig::new(allowed, canonical)
            .with_source_tag(self.source_tag.clone())
            .with_site_name(self.site_name.clone())
            .with_exchange_timeout(Duration::from_secs(self.exchange_timeout_seconds)))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = args.gate_config()?;
    debug!(
        allowed = ?config.allowed_origins.iter().collect::<Vec<_>>(),
        source_tag = %config.source_tag,
        "gate configured"
    );

    let provider = FirebaseProvider::new(&args.identity_endpoint, args.firebase_api_key)?;
    let state = Arc::new(AppState::new(AccessGate::new(config, provider)));

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            allowed_origins: vec![
                "https://nextstep-nexn.onrender.com".to_string(),
                "http://localhost:3000/".to_string(),
            ],
            source_tag: "nextstep-nexn".to_string(),
            canonical_origin: "https://nextstep-nexn.onrender.com".to_string(),
            site_name: "NextStep".to_string(),
            firebase_api_key: SecretString::from("key".to_string()),
            identity_endpoint: "https://identitytoolkit.googleapis.com".to_string(),
            exchange_timeout_seconds: 5,
        }
    }

    #[test]
    fn gate_config_from_args() {
        let config = args().gate_config().unwrap();
        assert!(config.allowed_origins.contains(Some("http://localhost:3000")));
        assert_eq!(config.exchange_timeout, Duration::from_secs(5));
        assert_eq!(
            config.canonical_origin.as_str(),
            "https://nextstep-nexn.onrender.com/"
        );
    }

    #[test]
    fn gate_config_rejects_bad_origin() {
        let mut args = args();
        args.allowed_origins.push("nope".to_string());
        let err = args.gate_config().unwrap_err();
        assert!(err.to_string().contains("Invalid allowed origin"));
    }
}
