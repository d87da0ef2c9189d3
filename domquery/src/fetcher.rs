use crate::error::{QueryError, Result};
use reqwest::redirect::Policy;
use url::Url;

/// Client settings for a [`Fetcher`]. Everything else uses reqwest defaults.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    pub user_agent: Option<String>,
    /// Proxy URL applied to every request, e.g. `http://localhost:8080/`.
    pub proxy: Option<String>,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// HTTP GET client that refuses to follow redirects.
///
/// A 3xx answer fails with [`QueryError::RedirectDetected`] instead of being
/// followed. Any other status hands back the body as-is.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().redirect(Policy::none());

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy) = config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the full body behind `url`.
    ///
    /// The response is dropped before returning on every path, which hands
    /// the connection back to the pool or closes it.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(%url, "fetching");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            tracing::warn!(%url, status = status.as_u16(), ?location, "redirect rejected");
            return Err(QueryError::RedirectDetected {
                url: url.to_string(),
                status: status.as_u16(),
                location,
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
