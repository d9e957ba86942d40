/// Configuration management for the trending service
///
/// All configuration is loaded from environment variables with sensible
/// defaults. Ranking knobs live in `TrendingConfig` and are passed into the
/// scoring engine and decay job at construction rather than read as globals.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Ranking configuration
    pub trending: TrendingConfig,
    /// Decay job configuration
    pub decay: DecayConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Ranking configuration (Beta priors, boosts, selection limits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    /// Beta prior alpha for posts with no history (mild optimism)
    pub alpha0: f64,
    /// Beta prior beta for posts with no history
    pub beta0: f64,
    /// Posts published within this many hours count as fresh
    pub fresh_hours: i64,
    /// Multiplicative boost applied to fresh posts
    pub fresh_multiplier: f64,
    /// Cap on the CTR part of the weak click boost
    pub ctr_boost_cap: f64,
    /// Cap on the click-volume part of the weak click boost
    pub volume_boost_cap: f64,
    /// Hard cap on the total weak click boost
    pub weak_click_cap: f64,
    /// Width of the uniform tie-break jitter
    pub jitter: f64,
    /// Default candidate lookback when no window is supplied
    pub default_window_days: i64,
    /// Upper bound on the requested result count
    pub max_limit: usize,
}

/// Decay job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Multiplier applied to all accumulated statistics per cycle
    pub factor: f64,
    /// Lower bound for alpha/beta after decay
    pub stat_floor: f64,
    /// Seconds between decay cycles (daily by default)
    pub interval_secs: u64,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            alpha0: 1.5,
            beta0: 1.0,
            fresh_hours: 72,
            fresh_multiplier: 1.10,
            ctr_boost_cap: 0.05,
            volume_boost_cap: 0.03,
            weak_click_cap: 0.08,
            jitter: 0.02,
            default_window_days: 60,
            max_limit: 50,
        }
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            factor: 0.97,
            stat_floor: 0.05,
            interval_secs: 24 * 60 * 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("TRENDING_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("TRENDING_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8085),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            trending: TrendingConfig {
                alpha0: parse_env_or_default("TRENDING_PRIOR_ALPHA", 1.5)?,
                beta0: parse_env_or_default("TRENDING_PRIOR_BETA", 1.0)?,
                fresh_hours: std::env::var("TRENDING_FRESH_HOURS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(72),
                fresh_multiplier: parse_env_or_default("TRENDING_FRESH_MULTIPLIER", 1.10)?,
                ctr_boost_cap: parse_env_or_default("TRENDING_CTR_BOOST_CAP", 0.05)?,
                volume_boost_cap: parse_env_or_default("TRENDING_VOLUME_BOOST_CAP", 0.03)?,
                weak_click_cap: parse_env_or_default("TRENDING_WEAK_CLICK_CAP", 0.08)?,
                jitter: parse_env_or_default("TRENDING_JITTER", 0.02)?,
                default_window_days: std::env::var("TRENDING_WINDOW_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
                max_limit: std::env::var("TRENDING_MAX_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50),
            },
            decay: DecayConfig {
                factor: {
                    let factor = parse_env_or_default("DECAY_FACTOR", 0.97)?;
                    if !(0.0..1.0).contains(&factor) {
                        return Err(format!("DECAY_FACTOR must be in (0,1), got {}", factor));
                    }
                    factor
                },
                stat_floor: parse_env_or_default("DECAY_STAT_FLOOR", 0.05)?,
                interval_secs: std::env::var("DECAY_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(24 * 60 * 60),
            },
        })
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, String> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
