use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin of the web app, used for gateway redirect callbacks.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// S3-compatible object storage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// e.g. `https://s3.us-east-1.amazonaws.com` or a MinIO/R2 endpoint
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentConfig {
    pub server_key: String,
    pub client_key: String,
    #[serde(default)]
    pub is_production: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no file: environment variables plus defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        public_base_url: get_env("PUBLIC_BASE_URL")
                            .unwrap_or_else(default_public_base_url),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("AUTH_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    storage: StorageConfig {
                        endpoint: get_env("STORAGE_ENDPOINT").unwrap_or_default(),
                        region: get_env("STORAGE_REGION").unwrap_or_else(default_region),
                        bucket: get_env("STORAGE_BUCKET").unwrap_or_default(),
                        access_key: get_env("STORAGE_ACCESS_KEY").unwrap_or_default(),
                        secret_key: get_env("STORAGE_SECRET_KEY").unwrap_or_default(),
                    },
                    payment: PaymentConfig {
                        server_key: get_env("PAYMENT_SERVER_KEY").unwrap_or_default(),
                        client_key: get_env("PAYMENT_CLIENT_KEY").unwrap_or_default(),
                        is_production: get_env_parse("PAYMENT_IS_PRODUCTION", false),
                        currency: get_env("PAYMENT_CURRENCY").unwrap_or_else(default_currency),
                    },
                }
            }
            Err(e) => {
                return Err(format!("failed to read config file {config_path}: {e}").into());
            }
        };

        // environment always wins over the file
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            if let Ok(p) = v.parse() {
                config.server.port = p;
            }
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            config.server.public_base_url = v;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS") {
            if let Ok(mc) = v.parse() {
                config.database.max_connections = mc;
            }
        }
        if let Ok(v) = env::var("AUTH_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN") {
            if let Ok(n) = v.parse() {
                config.jwt.access_token_expires_in = n;
            }
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN") {
            if let Ok(n) = v.parse() {
                config.jwt.refresh_token_expires_in = n;
            }
        }
        if let Ok(v) = env::var("STORAGE_ENDPOINT") {
            config.storage.endpoint = v;
        }
        if let Ok(v) = env::var("STORAGE_REGION") {
            config.storage.region = v;
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            config.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_ACCESS_KEY") {
            config.storage.access_key = v;
        }
        if let Ok(v) = env::var("STORAGE_SECRET_KEY") {
            config.storage.secret_key = v;
        }
        if let Ok(v) = env::var("PAYMENT_SERVER_KEY") {
            config.payment.server_key = v;
        }
        if let Ok(v) = env::var("PAYMENT_CLIENT_KEY") {
            config.payment.client_key = v;
        }
        if let Ok(v) = env::var("PAYMENT_IS_PRODUCTION") {
            if let Ok(b) = v.parse() {
                config.payment.is_production = b;
            }
        }
        if let Ok(v) = env::var("PAYMENT_CURRENCY") {
            config.payment.currency = v;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_applies_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/learnhub"
            max_connections = 5

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [storage]
            endpoint = "http://localhost:9000"
            bucket = "learnhub"
            access_key = "minio"
            secret_key = "minio123"

            [payment]
            server_key = "SB-Mid-server-x"
            client_key = "SB-Mid-client-x"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.public_base_url, "http://localhost:3000");
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.payment.currency, "IDR");
        assert!(!config.payment.is_production);
    }
}
