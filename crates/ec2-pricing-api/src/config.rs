use crate::shared::error::{PricingError, PricingResult};
use ec2_pricing_core::cost::DEFAULT_USD_TO_INR;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_DATA_PATH: &str = "data/aws_ec2_instances.xlsx";

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
    pub usd_to_inr: f64,
    pub preload_catalog: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            usd_to_inr: DEFAULT_USD_TO_INR,
            preload_catalog: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> PricingResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// `PRICING_API_ADDR` wins over `PORT`. A bad address is an error; a bad
    /// exchange rate or preload flag is logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> PricingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let addr = match (var("PRICING_API_ADDR"), var("PORT")) {
            (Some(addr), _) => addr
                .parse::<SocketAddr>()
                .map_err(|e| PricingError::Config(format!("PRICING_API_ADDR={addr}: {e}")))?,
            (None, Some(port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| PricingError::Config(format!("PORT={port}: {e}")))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => defaults.addr,
        };

        let data_path = var("EC2_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let usd_to_inr = match var("USD_INR_RATE") {
            None => defaults.usd_to_inr,
            Some(raw) => match raw.parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate > 0.0 => rate,
                _ => {
                    warn!(value = %raw, "Ignoring invalid USD_INR_RATE");
                    defaults.usd_to_inr
                }
            },
        };

        let preload_catalog = match var("PRELOAD_CATALOG").map(|v| v.to_ascii_lowercase()) {
            None => defaults.preload_catalog,
            Some(flag) => match flag.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    warn!(value = %flag, "Ignoring invalid PRELOAD_CATALOG");
                    defaults.preload_catalog
                }
            },
        };

        Ok(Self {
            addr,
            data_path,
            usd_to_inr,
            preload_catalog,
        })
    }
}
