//! Azure Resource Manager client for the IoT Hub resource.
//!
//! Three narrow calls: read the hub description (sku name and capacity),
//! read the quota metrics (the `TotalMessages` counter), and submit an
//! updated description with a new sku. The update path deliberately
//! round-trips the full description JSON rather than modeling the whole
//! resource: only `sku.name` and `sku.capacity` are ours to change.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use hubscale_core::{AuthConfig, Capacity, HubConfig, Tier};

use crate::auth::AadCredential;
use crate::error::{ControlError, ControlResult};
use crate::{HubReader, HubState, HubWriter};

/// Public-cloud resource-management endpoint.
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";

const API_VERSION: &str = "2018-04-01";

/// Quota metric carrying the consumed message count.
const TOTAL_MESSAGES_METRIC: &str = "TotalMessages";

#[derive(Debug, Deserialize)]
struct QuotaMetricPage {
    value: Vec<QuotaMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaMetric {
    name: String,
    current_value: f64,
}

/// Control-plane client for a single hub resource.
#[derive(Debug, Clone)]
pub struct ArmHubClient {
    http: reqwest::Client,
    credential: AadCredential,
    management_url: String,
    subscription_id: String,
    resource_group: String,
    hub_name: String,
}

impl ArmHubClient {
    pub fn new(hub: &HubConfig, auth: &AuthConfig, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential: AadCredential::new(auth, client_secret),
            management_url: auth
                .management_url
                .clone()
                .unwrap_or_else(|| DEFAULT_MANAGEMENT_URL.to_string()),
            subscription_id: hub.subscription_id.clone(),
            resource_group: hub.resource_group.clone(),
            hub_name: hub.name.clone(),
        }
    }

    fn hub_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Devices/IotHubs/{}",
            self.management_url, self.subscription_id, self.resource_group, self.hub_name
        )
    }

    /// Fetch the raw hub description. Errors come back as plain messages so
    /// the caller can classify them as read or write failures.
    async fn fetch_description(&self, token: &str) -> Result<Value, String> {
        let response = self
            .http
            .get(self.hub_url())
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("description request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("description request returned {status}: {body}"));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("failed to parse hub description: {e}"))
    }

    async fn fetch_usage(&self, token: &str) -> ControlResult<u64> {
        let url = format!("{}/quotaMetrics", self.hub_url());
        let response = self
            .http
            .get(&url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ControlError::Read(format!("quota metrics request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::Read(format!(
                "quota metrics request returned {status}: {body}"
            )));
        }

        let page: QuotaMetricPage = response.json().await.map_err(|e| {
            ControlError::Read(format!("failed to parse quota metrics: {e}"))
        })?;

        usage_from_metrics(&page).ok_or(ControlError::UsageMetricMissing)
    }
}

impl HubReader for ArmHubClient {
    async fn read(&self) -> ControlResult<HubState> {
        let token = self.credential.token().await?;

        let desc = self
            .fetch_description(&token)
            .await
            .map_err(ControlError::Read)?;
        let capacity = parse_capacity(&desc).map_err(ControlError::Read)?;
        if !capacity.is_valid() {
            warn!(%capacity, "hub reports a unit count outside the tier's range");
        }

        let total_messages = self.fetch_usage(&token).await?;
        debug!(%capacity, total_messages, "hub state read");

        Ok(HubState {
            capacity,
            total_messages,
        })
    }
}

impl HubWriter for ArmHubClient {
    async fn apply(&self, capacity: Capacity) -> ControlResult<()> {
        let token = self.credential.token().await?;

        // The update is a full PUT of the description, so fetch it fresh
        // and swap the sku in place.
        let mut desc = self
            .fetch_description(&token)
            .await
            .map_err(ControlError::Write)?;
        desc["sku"]["name"] = json!(capacity.tier.as_str());
        desc["sku"]["capacity"] = json!(capacity.units);

        let response = self
            .http
            .put(self.hub_url())
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .json(&desc)
            .send()
            .await
            .map_err(|e| ControlError::Write(format!("update request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::Write(format!(
                "update request returned {status}: {body}"
            )));
        }

        info!(hub = %self.hub_name, %capacity, "hub capacity update submitted");
        Ok(())
    }
}

/// Pull (tier, units) out of a hub description.
fn parse_capacity(desc: &Value) -> Result<Capacity, String> {
    let sku = desc
        .get("sku")
        .ok_or_else(|| "hub description has no sku".to_string())?;
    let name = sku
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| "hub sku has no name".to_string())?;
    let tier: Tier = name.parse().map_err(|e| format!("{e}"))?;
    let units = sku
        .get("capacity")
        .and_then(Value::as_u64)
        .ok_or_else(|| "hub sku has no capacity".to_string())?;
    let units = u32::try_from(units)
        .map_err(|_| format!("hub sku capacity {units} is out of range"))?;
    Ok(Capacity::new(tier, units))
}

/// Find the consumed message count in a quota metrics page.
fn usage_from_metrics(page: &QuotaMetricPage) -> Option<u64> {
    page.value
        .iter()
        .find(|m| m.name == TOTAL_MESSAGES_METRIC)
        .map(|m| m.current_value as u64)
}
