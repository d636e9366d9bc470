//! AAD client-credentials token acquisition.
//!
//! One form POST to the tenant's token endpoint per token. Runs are minutes
//! apart, so tokens are not cached across runs.

use serde::Deserialize;
use tracing::{debug, error};

use hubscale_core::AuthConfig;

use crate::error::{ControlError, ControlResult};

/// Public-cloud identity endpoint.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Resource the token is scoped to.
const MANAGEMENT_RESOURCE: &str = "https://management.core.windows.net/";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Service-principal credential for the control plane.
#[derive(Debug, Clone)]
pub struct AadCredential {
    http: reqwest::Client,
    authority_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl AadCredential {
    pub fn new(config: &AuthConfig, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_url: config
                .authority_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTHORITY_URL.to_string()),
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            client_secret,
        }
    }

    /// Acquire a bearer token for the management resource.
    pub async fn token(&self) -> ControlResult<String> {
        let url = format!("{}/{}/oauth2/token", self.authority_url, self.tenant_id);
        debug!(tenant = %self.tenant_id, "requesting management token");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("resource", MANAGEMENT_RESOURCE),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "token request failed");
                ControlError::Auth(format!("token request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "token endpoint returned error");
            return Err(ControlError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ControlError::Auth(format!("failed to parse token response: {e}"))
        })?;

        Ok(token.access_token)
    }
}
