use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::portraits::DEFAULT_PORTRAIT_HOST;

pub const DEFAULT_DATASET_PATH: &str = "assets/cleaned_fifa21_male2.csv";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8050";
pub const DEFAULT_PORTRAIT_TIMEOUT_SECS: u64 = 10;
const PORTRAIT_TIMEOUT_RANGE: (u64, u64) = (2, 60);

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub portrait_host: String,
    pub fetch_portraits: bool,
    pub portrait_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8050)),
            portrait_host: DEFAULT_PORTRAIT_HOST.to_string(),
            fetch_portraits: true,
            portrait_timeout: Duration::from_secs(DEFAULT_PORTRAIT_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    /// Reads `FIFA_DATASET`, `DASHBOARD_ADDR`, `PORTRAIT_HOST`, `PORTRAIT_FETCH`
    /// and `PORTRAIT_TIMEOUT_SECS` (clamped to 2..=60).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();
        if let Some(path) = get("FIFA_DATASET") {
            cfg.dataset_path = PathBuf::from(path);
        }
        if let Some(addr) = get("DASHBOARD_ADDR") {
            cfg.bind_addr = addr
                .parse()
                .with_context(|| format!("invalid DASHBOARD_ADDR \"{addr}\""))?;
        }
        if let Some(host) = get("PORTRAIT_HOST") {
            cfg.portrait_host = host;
        }
        if let Some(flag) = get("PORTRAIT_FETCH") {
            cfg.fetch_portraits = !matches!(flag.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(secs) = get("PORTRAIT_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .with_context(|| format!("invalid PORTRAIT_TIMEOUT_SECS \"{secs}\""))?;
            let (lo, hi) = PORTRAIT_TIMEOUT_RANGE;
            cfg.portrait_timeout = Duration::from_secs(secs.clamp(lo, hi));
        }
        Ok(cfg)
    }
}

/// `--dataset <path>` from the command line, if given.
pub fn parse_dataset_arg() -> Option<PathBuf> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--dataset" {
            return args.get(idx + 1).map(PathBuf::from);
        }
        if let Some(rest) = arg.strip_prefix("--dataset=") {
            return Some(PathBuf::from(rest));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn env_overrides() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("FIFA_DATASET", "/data/players.csv"),
            ("DASHBOARD_ADDR", "0.0.0.0:9000"),
            ("PORTRAIT_FETCH", "off"),
            ("PORTRAIT_HOST", " "),
        ]))
        .unwrap();
        assert_eq!(cfg.dataset_path, PathBuf::from("/data/players.csv"));
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert!(!cfg.fetch_portraits);
        assert_eq!(cfg.portrait_host, DEFAULT_PORTRAIT_HOST);
    }

    #[test]
    fn portrait_timeout_is_clamped() {
        let cfg = DashboardConfig::from_lookup(lookup(&[("PORTRAIT_TIMEOUT_SECS", "600")])).unwrap();
        assert_eq!(cfg.portrait_timeout, Duration::from_secs(60));
        let cfg = DashboardConfig::from_lookup(lookup(&[("PORTRAIT_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(cfg.portrait_timeout, Duration::from_secs(2));
        let cfg = DashboardConfig::from_lookup(lookup(&[("PORTRAIT_TIMEOUT_SECS", "15")])).unwrap();
        assert_eq!(cfg.portrait_timeout, Duration::from_secs(15));
        assert!(DashboardConfig::from_lookup(lookup(&[("PORTRAIT_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn bad_address_is_an_error() {
        assert!(DashboardConfig::from_lookup(lookup(&[("DASHBOARD_ADDR", "nowhere")])).is_err());
    }
}
