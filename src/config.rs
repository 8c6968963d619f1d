/// Public CEIDG v3 company search endpoint.
pub const DEFAULT_CEIDG_API_URL: &str = "https://dane.biznes.gov.pl/api/ceidg/v3/firmy";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ceidg_api_url: String,
    pub ceidg_api_key: String,
    pub cache_max_capacity: u64,
    /// Hex SHA-256 digests of accepted inbound bearer tokens. Empty disables auth.
    pub access_token_digests: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            ceidg_api_url: std::env::var("CEIDG_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CEIDG_API_URL.to_string()),
            ceidg_api_key: std::env::var("CEIDG_API_KEY")
                .map_err(|_| anyhow::anyhow!("CEIDG_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("CEIDG_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            cache_max_capacity: std::env::var("CACHE_MAX_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CACHE_MAX_CAPACITY must be a positive number"))?,
            access_token_digests: parse_token_digests(
                &std::env::var("ACCESS_TOKEN_SHA256").unwrap_or_default(),
            )?,
        };

        config.validate()?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("CEIDG API URL: {}", config.ceidg_api_url);
        tracing::debug!("Cache capacity: {}", config.cache_max_capacity);
        tracing::debug!("Server Port: {}", config.port);
        if config.access_token_digests.is_empty() {
            tracing::warn!("ACCESS_TOKEN_SHA256 not set - API endpoints are unauthenticated");
        } else {
            tracing::info!(
                "Bearer token auth enabled ({} token(s))",
                config.access_token_digests.len()
            );
        }

        Ok(config)
    }

    /// Checks values that may also come from places other than the environment.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.ceidg_api_url.starts_with("http://") && !self.ceidg_api_url.starts_with("https://")
        {
            anyhow::bail!("CEIDG_API_URL must start with http:// or https://");
        }
        if self.ceidg_api_key.trim().is_empty() {
            anyhow::bail!("CEIDG_API_KEY cannot be empty");
        }
        if self.cache_max_capacity == 0 {
            anyhow::bail!("CACHE_MAX_CAPACITY must be a positive number");
        }
        Ok(())
    }
}

/// Parses a comma-separated list of hex SHA-256 digests.
fn parse_token_digests(raw: &str) -> anyhow::Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|digest| -> anyhow::Result<String> {
            let bytes = hex::decode(digest).map_err(|_| {
                anyhow::anyhow!("ACCESS_TOKEN_SHA256 entries must be hex-encoded SHA-256 digests")
            })?;
            if bytes.len() != 32 {
                anyhow::bail!("ACCESS_TOKEN_SHA256 entries must be 64 hex characters");
            }
            Ok(digest.to_ascii_lowercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            port: 3000,
            ceidg_api_url: DEFAULT_CEIDG_API_URL.to_string(),
            ceidg_api_key: "key".to_string(),
            cache_max_capacity: 100,
            access_token_digests: vec![],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_non_http_url_rejected() {
        let config = Config {
            ceidg_api_url: "ftp://dane.biznes.gov.pl".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let config = Config {
            ceidg_api_key: "   ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_digests_parsing() {
        let digest = "A".repeat(64);
        let parsed = parse_token_digests(&format!(" {} , ,", digest)).unwrap();
        assert_eq!(parsed, vec!["a".repeat(64)]);

        assert!(parse_token_digests("").unwrap().is_empty());
        assert!(parse_token_digests("xyz").is_err());
        assert!(parse_token_digests("abcd").is_err());
    }
}
