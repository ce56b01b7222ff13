/*
 * Responsibility
 * - 環境変数の読み込み (PORT, CORS 許可, Auth0 domain / audience など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::services::auth::jwks::HttpKeySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub auth0_domain: String,
    pub api_audience: String,
    pub auth_algorithms: Vec<Algorithm>,
    pub jwks_url: Url,
    pub jwks_fetch_timeout: Duration,
    pub jwks_min_refresh_interval: Duration,
    pub access_token_leeway_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(var("PORT"), 3000, "PORT")?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(parse_or(
            var("REQUEST_TIMEOUT_SECONDS"),
            30,
            "REQUEST_TIMEOUT_SECONDS",
        )?);

        let auth0_domain = var("AUTH0_DOMAIN")
            .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();
        if auth0_domain.is_empty() || auth0_domain.contains('/') {
            return Err(ConfigError::Invalid("AUTH0_DOMAIN"));
        }

        let api_audience = var("API_AUDIENCE").ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let auth_algorithms = parse_algorithms(var("AUTH_ALGORITHMS").as_deref())?;

        let jwks_url = match var("AUTH_JWKS_URL") {
            Some(raw) => Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?,
            None => HttpKeySource::well_known_url(&auth0_domain)
                .map_err(|_| ConfigError::Invalid("AUTH0_DOMAIN"))?,
        };

        let jwks_fetch_timeout = Duration::from_millis(parse_or(
            var("JWKS_FETCH_TIMEOUT_MS"),
            3000,
            "JWKS_FETCH_TIMEOUT_MS",
        )?);

        let jwks_min_refresh_interval = Duration::from_secs(parse_or(
            var("JWKS_MIN_REFRESH_SECONDS"),
            30,
            "JWKS_MIN_REFRESH_SECONDS",
        )?);

        let access_token_leeway_seconds = parse_or(
            var("ACCESS_TOKEN_LEEWAY_SECONDS"),
            0,
            "ACCESS_TOKEN_LEEWAY_SECONDS",
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            auth0_domain,
            api_audience,
            auth_algorithms,
            jwks_url,
            jwks_fetch_timeout,
            jwks_min_refresh_interval,
            access_token_leeway_seconds,
        })
    }

    /// The provider signs tokens with `iss = https://{domain}/`.
    pub fn auth_issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T, key: &'static str) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// Keys come from an RSA key set, so only RSA-family algorithms make sense.
fn parse_algorithms(raw: Option<&str>) -> Result<Vec<Algorithm>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(vec![Algorithm::RS256]);
    };

    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg = Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;
        if !matches!(
            alg,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }
    Ok(algorithms)
}
