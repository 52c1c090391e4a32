use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

// The image CDN rejects requests without a browser-looking agent.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// A blocking client built on first use with a fixed request timeout.
pub struct LazyClient {
    timeout: Duration,
    client: OnceCell<Client>,
}

impl LazyClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceCell::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .user_agent(DESKTOP_USER_AGENT)
                .build()
                .context("failed to build http client")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_built_once() {
        let lazy = LazyClient::new(Duration::from_secs(3));
        assert_eq!(lazy.timeout(), Duration::from_secs(3));
        let first = lazy.get().unwrap() as *const Client;
        let second = lazy.get().unwrap() as *const Client;
        assert_eq!(first, second);
    }
}
