//! Firebase Identity Toolkit client. A custom token is signed in with
//! `accounts:signInWithCustomToken`, and the resulting ID token is resolved to
//! a user record with `accounts:lookup`.

use super::{Identity, IdentityProvider, ProviderError};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

const SIGN_IN_PATH: &str = "/v1/accounts:signInWithCustomToken";
const LOOKUP_PATH: &str = "/v1/accounts:lookup";
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

#[derive(Clone, Debug)]
pub struct FirebaseProvider {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseProvider {
    /// Build a client for the given Identity Toolkit endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: &str, api_key: SecretString) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Error creating reqwest client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.endpoint))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.without_url().to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()));
    }

    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map_or_else(|_| status.to_string(), |envelope| envelope.error.message);

    if status.is_client_error() {
        Err(ProviderError::Rejected(message))
    } else {
        Err(ProviderError::Unavailable(message))
    }
}

impl IdentityProvider for FirebaseProvider {
    #[instrument(skip_all)]
    async fn exchange(&self, token: &str) -> Result<Identity, ProviderError> {
        let signed_in: SignInResponse = self
            .post(
                SIGN_IN_PATH,
                &SignInRequest {
                    token,
                    return_secure_token: true,
                },
            )
            .await?;

        let lookup: LookupResponse = self
            .post(
                LOOKUP_PATH,
                &LookupRequest {
                    id_token: &signed_in.id_token,
                },
            )
            .await?;

        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("no user record".to_string()))?;

        debug!(uid = %user.local_id, "token exchanged");

        Ok(Identity::new(user.local_id, user.email))
    }
}
