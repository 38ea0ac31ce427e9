use std::{env, time::Duration};

use crate::payment::SimulatedGateway;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub payment_latency: Duration,
    pub payment_success_rate: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let payment_latency = parse_latency(env::var("PAYMENT_LATENCY_MS").ok().as_deref());
        let payment_success_rate =
            parse_success_rate(env::var("PAYMENT_SUCCESS_RATE").ok().as_deref());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            payment_latency,
            payment_success_rate,
        })
    }
}

fn parse_latency(raw: Option<&str>) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(SimulatedGateway::DEFAULT_LATENCY)
}

fn parse_success_rate(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .map(|rate| rate.clamp(0.0, 1.0))
        .unwrap_or(SimulatedGateway::DEFAULT_SUCCESS_RATE)
}
