use redis::aio::ConnectionManager;

use crate::{errors::SocialError, keys::KeyContext};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";
const DEFAULT_KEY_PREFIX: &str = "plaza";
const DEFAULT_SERVICE: &str = "social";

/// Connection and key-namespace settings for the document store.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// First key segment; lets several deployments share one Redis.
    pub prefix: String,
    /// Second key segment, naming this service's slice of the keyspace.
    pub service: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl Config {
    /// Reads `PLAZA_REDIS_URL` and `PLAZA_KEY_PREFIX`, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PLAZA_REDIS_URL") {
            config.redis_url = url;
        }
        if let Ok(prefix) = std::env::var("PLAZA_KEY_PREFIX") {
            config.prefix = prefix;
        }
        config
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn keys(&self) -> KeyContext {
        KeyContext::new(&self.prefix, &self.service)
    }

    pub(crate) fn client(&self) -> Result<redis::Client, SocialError> {
        Ok(redis::Client::open(self.redis_url.as_str())?)
    }

    pub(crate) async fn connection_manager(&self) -> Result<ConnectionManager, SocialError> {
        Ok(self.client()?.get_connection_manager().await?)
    }
}
