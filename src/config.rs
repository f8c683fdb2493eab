use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub esewa: EsewaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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

/// Where the storefront lives and who may call us from a browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub frontend_url: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            allowed_origins: vec![],
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub root: String,
    /// Absolute URL prefix under which `root` is served, e.g. `http://127.0.0.1:8000/media/`
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
            base_url: "http://127.0.0.1:8000/media/".to_string(),
        }
    }
}

impl MediaConfig {
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub shipping_cents: i64,
    pub currency: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            shipping_cents: 1000,
            currency: "usd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    pub secret_key: String,
    #[serde(default)]
    pub publishable_key: String,
    #[serde(default)]
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsewaConfig {
    pub product_code: String,
    pub secret_key: String,
    pub form_url: String,
    pub status_url: String,
    /// Also ask eSewa's status API before materializing an order
    #[serde(default)]
    pub confirm_with_status_api: bool,
}

impl Default for EsewaConfig {
    fn default() -> Self {
        // eSewa's public sandbox merchant
        Self {
            product_code: "EPAYTEST".to_string(),
            secret_key: "8g8M8ksRXz9S7S4U".to_string(),
            form_url: "https://rc-epay.esewa.com.np/api/epay/main/v2/form".to_string(),
            status_url: "https://rc.esewa.com.np/api/epay/transaction/status/".to_string(),
            confirm_with_status_api: false,
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no file: the database URL must come from the environment
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;
                Self::from_env_defaults(database_url)
            }
            Err(e) => {
                return Err(format!("Unable to read {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_env_defaults(database_url: String) -> Self {
        Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8000u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("SECRET_KEY")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 5 * 86_400i64),
                refresh_token_expires_in: get_env_parse("JWT_REFRESH_EXPIRES_IN", 15 * 86_400i64),
            },
            client: ClientConfig::default(),
            media: MediaConfig::default(),
            checkout: CheckoutConfig::default(),
            stripe: StripeConfig::default(),
            esewa: EsewaConfig::default(),
        }
    }

    /// Environment variables win over the file, key by key.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SECRET_KEY") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.client.frontend_url = v;
        }
        if let Ok(v) = env::var("ALLOWED_HOSTS") {
            self.client.allowed_origins = parse_list(&v);
        }
        if let Ok(v) = env::var("DEBUG") {
            self.client.debug = parse_bool(&v);
        }
        if let Ok(v) = env::var("MEDIA_ROOT") {
            self.media.root = v;
        }
        if let Ok(v) = env::var("MEDIA_BASE_URL") {
            self.media.base_url = v;
        }
        if let Ok(v) = env::var("SHIPPING_CENTS")
            && let Ok(n) = v.parse()
        {
            self.checkout.shipping_cents = n;
        }
        if let Ok(v) = env::var("CHECKOUT_CURRENCY") {
            self.checkout.currency = v.to_ascii_lowercase();
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_PUBLISHABLE_KEY") {
            self.stripe.publishable_key = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("ESEWA_PRODUCT_CODE") {
            self.esewa.product_code = v;
        }
        if let Ok(v) = env::var("ESEWA_SECRET_KEY") {
            self.esewa.secret_key = v;
        }
        if let Ok(v) = env::var("ESEWA_FORM_URL") {
            self.esewa.form_url = v;
        }
        if let Ok(v) = env::var("ESEWA_STATUS_URL") {
            self.esewa.status_url = v;
        }
        if let Ok(v) = env::var("ESEWA_CONFIRM_STATUS") {
            self.esewa.confirm_with_status_api = parse_bool(&v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_url_joins_without_double_slash() {
        let media = MediaConfig {
            root: "media".to_string(),
            base_url: "http://localhost:8000/media/".to_string(),
        };
        assert_eq!(
            media.url_for("/products/mes.png"),
            "http://localhost:8000/media/products/mes.png"
        );
        assert_eq!(
            media.url_for("products/h.png"),
            "http://localhost:8000/media/products/h.png"
        );
    }

    #[test]
    fn test_parse_list_and_bool() {
        assert_eq!(
            parse_list("localhost, 127.0.0.1,,"),
            vec!["localhost".to_string(), "127.0.0.1".to_string()]
        );
        assert!(parse_bool("True"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.checkout.shipping_cents, 1000);
        assert_eq!(config.checkout.currency, "usd");
        assert_eq!(config.esewa.product_code, "EPAYTEST");
        assert_eq!(config.client.frontend_url, "http://localhost:5173");
    }
}
