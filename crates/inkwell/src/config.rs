//! Configuration for the blog service.

use std::time::Duration;

use crate::error::{BlogError, Result};

/// Environment variable holding the token signing secret.
pub const ENV_TOKEN_SECRET: &str = "INKWELL_TOKEN_SECRET";
/// Environment variable holding the token lifetime in seconds.
pub const ENV_TOKEN_TTL_SECS: &str = "INKWELL_TOKEN_TTL_SECS";
/// Environment variable holding the number of slug attempts.
pub const ENV_SLUG_ATTEMPTS: &str = "INKWELL_SLUG_ATTEMPTS";

/// Configuration for the blog service.
#[derive(Clone)]
pub struct BlogConfig {
    /// HMAC secret used to sign identity tokens.
    pub token_secret: String,
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
    /// How many times article creation re-derives a slug after losing a
    /// race for it. At least one attempt is always made.
    pub slug_attempts: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            token_secret: "inkwell-development-secret".to_string(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            slug_attempts: 3,
        }
    }
}

impl std::fmt::Debug for BlogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogConfig")
            .field("token_ttl", &self.token_ttl)
            .field("slug_attempts", &self.slug_attempts)
            .finish_non_exhaustive()
    }
}

impl BlogConfig {
    /// Build a config from the process environment.
    ///
    /// Unset variables keep their default; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secret) = lookup(ENV_TOKEN_SECRET) {
            if secret.is_empty() {
                return Err(BlogError::Config(format!("{} is empty", ENV_TOKEN_SECRET)));
            }
            config.token_secret = secret;
        }
        if let Some(ttl) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs = parse::<u64>(ENV_TOKEN_TTL_SECS, &ttl)?;
            config.token_ttl = Duration::from_secs(secs);
        }
        if let Some(attempts) = lookup(ENV_SLUG_ATTEMPTS) {
            config.slug_attempts = parse(ENV_SLUG_ATTEMPTS, &attempts)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BlogError::Config(format!("{}={:?}: {}", key, value, e)))
}
