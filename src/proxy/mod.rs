use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::config::ProxyConfig;

/// Credentials for one proxy endpoint, fetched fresh every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCredential {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyCredential {
    /// `host:port` label reported in the result
    pub fn label(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Build a reqwest proxy routing all traffic through this endpoint
    pub fn to_reqwest(&self) -> reqwest::Result<reqwest::Proxy> {
        Ok(reqwest::Proxy::all(format!("http://{}", self.label()))?
            .basic_auth(&self.username, &self.password))
    }
}

/// Source of proxies for a run; implementations never fail, they return an empty list instead
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    async fn fetch_proxies(&self) -> Vec<ProxyCredential>;
}

/// Pick one proxy uniformly at random
pub fn choose_proxy<R: Rng + ?Sized>(
    proxies: &[ProxyCredential],
    rng: &mut R,
) -> Option<ProxyCredential> {
    proxies.choose(rng).cloned()
}

#[derive(Debug, Deserialize)]
struct ProxyListResponse {
    results: Vec<ProxyEntry>,
}

#[derive(Debug, Deserialize)]
struct ProxyEntry {
    proxy_address: Option<String>,
    port: u16,
    username: String,
    password: String,
}

/// Parse a Webshare proxy list body
pub fn parse_proxy_list(body: &str, backbone_host: &str) -> serde_json::Result<Vec<ProxyCredential>> {
    let response: ProxyListResponse = serde_json::from_str(body)?;

    Ok(response
        .results
        .into_iter()
        .map(|entry| ProxyCredential {
            address: entry
                .proxy_address
                .filter(|address| !address.is_empty())
                .unwrap_or_else(|| backbone_host.to_string()),
            port: entry.port,
            username: entry.username,
            password: entry.password,
        })
        .collect())
}

/// Webshare proxy list client
pub struct WebshareClient {
    config: ProxyConfig,
    http: reqwest::Client,
}

impl WebshareClient {
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: ProxyConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    async fn request(&self, api_key: &str) -> anyhow::Result<Vec<ProxyCredential>> {
        let page_size = self.config.page_size.to_string();

        let response = self
            .http
            .get(&self.config.api_url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", api_key))
            .query(&[("mode", self.config.mode.as_str()), ("page_size", page_size.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Webshare API error: {} - {}", status.as_u16(), body);
        }

        Ok(parse_proxy_list(&body, &self.config.backbone_host)?)
    }
}

#[async_trait]
impl ProxyProvider for WebshareClient {
    async fn fetch_proxies(&self) -> Vec<ProxyCredential> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("No Webshare API key provided, continuing without proxies");
            return Vec::new();
        };

        let prefix: String = api_key.chars().take(5).collect();
        tracing::info!("Fetching proxies from Webshare API with key: {}...", prefix);

        match self.request(api_key).await {
            Ok(proxies) => {
                tracing::info!("Fetched {} proxies from Webshare", proxies.len());
                proxies
            }
            Err(e) => {
                tracing::warn!("Failed to fetch Webshare proxies: {:#}", e);
                Vec::new()
            }
        }
    }
}
