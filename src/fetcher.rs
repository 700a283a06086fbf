use crate::{InitError, LoadError};
use reqwest::{header::HeaderMap, Client};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Browser identity sent to websites that reject default or bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Upper bound on downloaded page size.
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024;

/// Raw response of a successful GET.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("html"))
            .unwrap_or(true)
    }

    pub fn is_text(&self) -> bool {
        match self.content_type.as_deref() {
            None => true,
            Some(ct) => {
                ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
            }
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    max_content_size: usize,
}

impl Fetcher {
    pub fn new() -> Result<Self, InitError> {
        debug!("Fetcher initialized with default configuration");
        Self::new_with_config(FetcherConfig::default())
    }

    /// Fetcher used for arbitrary websites: browser user agent and no TLS
    /// certificate verification.
    pub fn new_website_client() -> Result<Self, InitError> {
        Self::new_with_config(FetcherConfig::website())
    }

    /// Creates a Fetcher with custom configuration. Fails only when the TLS
    /// backend cannot be initialized.
    pub fn new_with_config(config: FetcherConfig) -> Result<Self, InitError> {
        let mut client_builder = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout);

        if let Some(headers) = config.headers {
            client_builder = client_builder.default_headers(headers);
        }

        if let Some(redirect_policy) = config.redirect_policy {
            client_builder = client_builder.redirect(redirect_policy);
        }

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this fetcher");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            error!(error = %e, "Failed to create HTTP client");
            InitError::Client(e.to_string())
        })?;

        Ok(Self {
            client,
            max_content_size: config.max_content_size,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }

    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, LoadError> {
        debug!(url = %url, "Starting fetch request");

        let mut response = self.client.get(url).send().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to send request");
            LoadError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Request returned an error status");
            return Err(LoadError::Network(format!("{url} returned HTTP {status}")));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_content_size as u64 {
                warn!(url = %url, content_length = length, "Response exceeds size limit");
                return Err(self.too_large(url));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        // the declared length can be absent or wrong, so count while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to read response body");
            LoadError::from(e)
        })? {
            if bytes.len() + chunk.len() > self.max_content_size {
                warn!(url = %url, "Response body exceeded size limit while streaming");
                return Err(self.too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(url = %url, content_length = body.len(), "Successfully fetched page");
        Ok(FetchedPage {
            url: final_url,
            content_type,
            body,
        })
    }

    fn too_large(&self, url: &str) -> LoadError {
        LoadError::Unsupported(format!(
            "{url} is larger than the {} byte limit",
            self.max_content_size
        ))
    }
}

/// Options for building a [`Fetcher`].
///
/// ```ignore
/// let fetcher = Fetcher::new_with_config(FetcherConfig {
///     timeout: Duration::from_secs(5),
///     ..FetcherConfig::website()
/// })?;
/// ```
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: Option<HeaderMap>,
    pub redirect_policy: Option<reqwest::redirect::Policy>,
    /// Skip TLS certificate verification. Availability over transport
    /// security: only meant for the generic website loader.
    pub accept_invalid_certs: bool,
    /// Largest body accepted, in bytes.
    pub max_content_size: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("url-summarizer/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            headers: None,
            redirect_policy: None,
            accept_invalid_certs: false,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }
}

impl FetcherConfig {
    pub fn website() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            redirect_policy: Some(reqwest::redirect::Policy::limited(10)),
            accept_invalid_certs: true,
            ..Self::default()
        }
    }

    /// Browser-like client for the video platform, which serves a consent
    /// interstitial to unknown agents.
    pub fn video_platform() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            reqwest::header::COOKIE,
            reqwest::header::HeaderValue::from_static("CONSENT=YES+1"),
        );

        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            headers: Some(headers),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_content_size(mut self, bytes: usize) -> Self {
        self.max_content_size = bytes;
        self
    }
}
