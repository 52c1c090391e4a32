use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rayon::prelude::*;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::http_client::LazyClient;

pub const DEFAULT_PORTRAIT_HOST: &str = "cdn.sofifa.net";

/// Paper coordinates (x, y) of the four portrait slots, in result order.
pub const PORTRAIT_SLOTS: [(f64, f64); 4] = [(0.1, 0.0), (0.1, 0.8), (0.9, 0.0), (0.9, 0.8)];

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="120" viewBox="0 0 120 120"><rect width="120" height="120" rx="12" fill="#e0e0e0"/><circle cx="60" cy="46" r="22" fill="#9e9e9e"/><path d="M22 108c4-24 20-36 38-36s34 12 38 36z" fill="#9e9e9e"/></svg>"##;

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

pub trait PortraitSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// Fetches over HTTP and keeps every successful body in memory, keyed by URL.
pub struct HttpPortraitSource {
    client: LazyClient,
    cache: Mutex<HashMap<String, FetchedImage>>,
}

impl HttpPortraitSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: LazyClient::new(timeout),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, url: &str) -> Result<Option<FetchedImage>> {
        let guard = self
            .cache
            .lock()
            .map_err(|_| anyhow!("portrait cache lock poisoned"))?;
        Ok(guard.get(url).cloned())
    }

    fn remember(&self, url: &str, image: FetchedImage) -> Result<()> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|_| anyhow!("portrait cache lock poisoned"))?;
        guard.insert(url.to_string(), image);
        Ok(())
    }
}

impl PortraitSource for HttpPortraitSource {
    fn fetch(&self, url: &str) -> Result<FetchedImage> {
        if let Some(hit) = self.cached(url)? {
            return Ok(hit);
        }

        let client = self.client.get()?;
        let resp = client.get(url).send().context("portrait request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/png")
            .to_string();
        let bytes = resp.bytes().context("failed reading portrait body")?.to_vec();
        if bytes.is_empty() {
            return Err(anyhow!("empty portrait body for {url}"));
        }

        let image = FetchedImage {
            content_type,
            bytes,
        };
        self.remember(url, image.clone())?;
        Ok(image)
    }
}

/// Used when portrait fetching is switched off; every slot gets a placeholder.
pub struct NoPortraits;

impl PortraitSource for NoPortraits {
    fn fetch(&self, _url: &str) -> Result<FetchedImage> {
        Err(anyhow!("portrait fetching disabled"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Portrait {
    Fetched { url: String, data_uri: String },
    Missing { url: Option<String>, reason: String },
}

impl Portrait {
    /// Image source for the chart: the portrait itself or the placeholder.
    pub fn image_source(&self) -> String {
        match self {
            Portrait::Fetched { data_uri, .. } => data_uri.clone(),
            Portrait::Missing { .. } => placeholder_data_uri(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Portrait::Missing { .. })
    }
}

pub fn placeholder_data_uri() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
}

/// Swaps the host segment of `scheme://host/path`.
pub fn rewrite_portrait_host(url: &str, host: &str) -> Option<String> {
    let mut parts: Vec<&str> = url.trim().split('/').collect();
    if parts.len() < 4 || !parts[0].ends_with(':') || !parts[1].is_empty() || parts[2].is_empty() {
        return None;
    }
    parts[2] = host;
    Some(parts.join("/"))
}

/// Fetches all portraits concurrently. Failures are local to their slot.
pub fn load_portraits(photo_urls: &[&str], host: &str, source: &dyn PortraitSource) -> Vec<Portrait> {
    photo_urls
        .par_iter()
        .map(|raw| {
            let Some(url) = rewrite_portrait_host(raw, host) else {
                return Portrait::Missing {
                    url: None,
                    reason: format!("unusable photo url \"{raw}\""),
                };
            };
            match source.fetch(&url) {
                Ok(image) => Portrait::Fetched {
                    data_uri: image.data_uri(),
                    url,
                },
                Err(err) => {
                    tracing::warn!(%url, error = %err, "portrait fetch failed");
                    Portrait::Missing {
                        url: Some(url),
                        reason: format!("{err:#}"),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource;

    impl PortraitSource for FakeSource {
        fn fetch(&self, url: &str) -> Result<FetchedImage> {
            if url.contains("broken") {
                return Err(anyhow!("http 404 Not Found"));
            }
            Ok(FetchedImage {
                content_type: "image/png".to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            })
        }
    }

    #[test]
    fn host_is_rewritten() {
        assert_eq!(
            rewrite_portrait_host("https://cdn.sofifa.com/players/158/023/21_120.png", DEFAULT_PORTRAIT_HOST)
                .as_deref(),
            Some("https://cdn.sofifa.net/players/158/023/21_120.png")
        );
        assert_eq!(rewrite_portrait_host("not a url", DEFAULT_PORTRAIT_HOST), None);
        assert_eq!(rewrite_portrait_host("", DEFAULT_PORTRAIT_HOST), None);
    }

    #[test]
    fn failures_stay_in_their_slot() {
        let urls = [
            "https://a.example/players/1.png",
            "https://a.example/broken/2.png",
            "garbage",
            "https://a.example/players/4.png",
        ];
        let portraits = load_portraits(&urls, "img.example", &FakeSource);
        assert_eq!(portraits.len(), 4);
        assert!(!portraits[0].is_missing());
        assert!(portraits[1].is_missing());
        assert!(portraits[2].is_missing());
        assert!(!portraits[3].is_missing());
        match &portraits[0] {
            Portrait::Fetched { url, data_uri } => {
                assert_eq!(url, "https://img.example/players/1.png");
                assert_eq!(data_uri, "data:image/png;base64,iVBORw==");
            }
            other => panic!("unexpected portrait: {other:?}"),
        }
        assert!(portraits[1].image_source().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn disabled_source_yields_placeholders() {
        let portraits = load_portraits(&["https://a.example/p/1.png"], DEFAULT_PORTRAIT_HOST, &NoPortraits);
        assert_eq!(portraits[0].image_source(), placeholder_data_uri());
    }
}
