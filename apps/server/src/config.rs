use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use rebalancer_core::{constants::DEFAULT_DRIFT_BAND, RoundingMode};

/// Planner settings applied when a request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerDefaults {
    pub rounding_mode: RoundingMode,
    pub auto_distribute_leftover: bool,
    pub drift_band: f64,
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            rounding_mode: RoundingMode::Exact,
            auto_distribute_leftover: true,
            drift_band: DEFAULT_DRIFT_BAND,
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub planner: PlannerDefaults,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("RB_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid RB_LISTEN_ADDR")?;
        let cors_allow = std::env::var("RB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("RB_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);

        let defaults = PlannerDefaults::default();
        let rounding_mode = std::env::var("RB_DEFAULT_ROUNDING_MODE")
            .map(|v| RoundingMode::parse(&v))
            .unwrap_or(defaults.rounding_mode);
        let auto_distribute_leftover = std::env::var("RB_AUTO_DISTRIBUTE_LEFTOVER")
            .ok()
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(defaults.auto_distribute_leftover);
        let drift_band = std::env::var("RB_DRIFT_BAND")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|band| band.is_finite() && *band >= 0.0)
            .unwrap_or(defaults.drift_band);

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            planner: PlannerDefaults {
                rounding_mode,
                auto_distribute_leftover,
                drift_band,
            },
        })
    }
}
