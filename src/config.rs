//! Configuration for pinboard
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// pinboard - social content-sharing backend
#[derive(Parser, Debug, Clone)]
#[command(name = "pinboard")]
#[command(about = "REST + WebSocket backend for a pin-sharing social network")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "pinboard")]
    pub mongodb_db: String,

    /// JWT secret for token verification (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Enable development mode (insecure default JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false", action = clap::ArgAction::Set)]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum concurrent notification stream connections
    #[arg(long, env = "STREAM_MAX_CLIENTS", default_value = "16384")]
    pub stream_max_clients: usize,

    /// Interval between follower-counter reconciliation passes in seconds.
    /// 0 disables the job.
    #[arg(long, env = "RECONCILE_INTERVAL_SECS", default_value = "300")]
    pub reconcile_interval_secs: u64,

    /// Default page size for list endpoints
    #[arg(long, env = "PAGE_SIZE_DEFAULT", default_value = "20")]
    pub page_size_default: i64,

    /// Maximum page size for list endpoints
    #[arg(long, env = "PAGE_SIZE_MAX", default_value = "50")]
    pub page_size_max: i64,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("JWT_SECRET is required in production mode")
        }
    }

    /// Clamp a requested page size to the configured bounds
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(l) if l >= 1 => l.min(self.page_size_max),
            _ => self.page_size_default,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.page_size_default > self.page_size_max {
            return Err("PAGE_SIZE_DEFAULT must not exceed PAGE_SIZE_MAX".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_args() -> Args {
        Args::parse_from(["pinboard", "--dev-mode", "true"])
    }

    #[test]
    fn dev_mode_has_fallback_secret() {
        let args = dev_args();
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret(), "dev-only-insecure-secret");
    }

    #[test]
    fn production_requires_secret() {
        let args = Args::parse_from(["pinboard"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn limit_clamping() {
        let args = dev_args();
        assert_eq!(args.clamp_limit(None), 20);
        assert_eq!(args.clamp_limit(Some(0)), 20);
        assert_eq!(args.clamp_limit(Some(10)), 10);
        assert_eq!(args.clamp_limit(Some(500)), 50);
    }
}
