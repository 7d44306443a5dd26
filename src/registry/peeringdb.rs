use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;

use super::{AsnRecord, AsnRegistry, RegistryError};

pub const DEFAULT_URL: &str = "https://peeringdb.com";
const TIMEOUT: Duration = Duration::from_secs(5);

/// PeeringDB `/api/net` client
#[derive(Clone, Debug)]
pub struct PeeringDb {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NetResponse {
    data: Vec<NetData>,
}

#[derive(Debug, Deserialize)]
struct NetData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    irr_as_set: Option<String>,
    #[serde(default)]
    info_prefixes4: Option<u64>,
    #[serde(default)]
    info_prefixes6: Option<u64>,
}

impl PeeringDb {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_base_url(DEFAULT_URL)
    }

    /// E.g. "https://peeringdb.com" (no trailing `/api`)
    pub fn with_base_url(base_url: &str) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AsnRegistry for PeeringDb {
    async fn fetch(&self, asn: u32) -> Result<AsnRecord, RegistryError> {
        info!("Running PeeringDB query for AS{}", asn);
        let url = format!("{}/api/net", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("asn", asn)])
            .send()
            .await
            .map_err(|source| RegistryError::Http { asn, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                asn,
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Http { asn, source })?;
        record_from_body(asn, &body)
    }
}

/// Decode an `/api/net` response body, keeping only the first network
fn record_from_body(asn: u32, body: &str) -> Result<AsnRecord, RegistryError> {
    let response: NetResponse =
        serde_json::from_str(body).map_err(|source| RegistryError::Decode { asn, source })?;
    if response.data.len() > 1 {
        debug!(
            "PeeringDB returned {} networks for AS{}, using the first",
            response.data.len(),
            asn
        );
    }
    let net = response
        .data
        .into_iter()
        .next()
        .ok_or(RegistryError::NoRecord(asn))?;
    Ok(AsnRecord {
        name: net.name,
        as_set: net.irr_as_set.unwrap_or_default(),
        max_prefix4: net.info_prefixes4.unwrap_or_default(),
        max_prefix6: net.info_prefixes6.unwrap_or_default(),
    })
}
