use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; without one users are kept in memory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.max_connections),
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.port),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_addr_parses() {
        let addr = AppConfig::default().addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn bad_host_is_an_error() {
        let config = AppConfig {
            host: "not a host".into(),
            ..AppConfig::default()
        };
        assert!(config.addr().is_err());
    }
}
