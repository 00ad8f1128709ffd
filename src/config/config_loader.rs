use anyhow::{Context, Result};
use std::str::FromStr;

use super::config_model::{Database, DotEnvyConfig, Processing, Server};

const DEFAULT_PROCESSING_DELAY_MS: u64 = 2000;
const DEFAULT_PROCESSING_QUEUE_CAPACITY: usize = 256;

/// Reads the process environment. `.env` is loaded once by the binary before
/// logging starts, so `RUST_LOG` from the file applies too.
pub fn load() -> Result<DotEnvyConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

pub fn from_lookup<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = Server {
        port: required(&lookup, "SERVER_PORT")?,
        body_limit: required(&lookup, "SERVER_BODY_LIMIT")?,
        timeout: required(&lookup, "SERVER_TIMEOUT")?,
    };

    let database = lookup("DATABASE_URL")
        .filter(|url| !url.trim().is_empty())
        .map(|url| Database { url });

    let processing = Processing {
        delay_ms: optional(&lookup, "PROCESSING_DELAY_MS")?
            .unwrap_or(DEFAULT_PROCESSING_DELAY_MS),
        queue_capacity: optional(&lookup, "PROCESSING_QUEUE_CAPACITY")?
            .unwrap_or(DEFAULT_PROCESSING_QUEUE_CAPACITY),
        simulator_seed: optional(&lookup, "SIMULATOR_SEED")?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        processing,
    })
}

fn required<F, V>(lookup: &F, key: &str) -> Result<V>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).with_context(|| format!("{key} is missing"))?;
    raw.trim()
        .parse()
        .with_context(|| format!("{key} is invalid: {raw:?}"))
}

fn optional<F, V>(lookup: &F, key: &str) -> Result<Option<V>>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} is invalid: {raw:?}")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const SERVER: [(&str, &str); 3] = [
        ("SERVER_PORT", "8080"),
        ("SERVER_BODY_LIMIT", "1"),
        ("SERVER_TIMEOUT", "30"),
    ];

    #[test]
    fn minimal_env_uses_defaults() {
        let config = from_lookup(lookup_from(&SERVER)).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit, 1);
        assert_eq!(config.server.timeout, 30);
        assert!(config.database.is_none());
        assert_eq!(config.processing.delay_ms, 2000);
        assert_eq!(config.processing.queue_capacity, 256);
        assert_eq!(config.processing.simulator_seed, None);
    }

    #[test]
    fn reads_optional_settings() {
        let mut pairs = SERVER.to_vec();
        pairs.extend([
            ("DATABASE_URL", "postgres://localhost/payments"),
            ("PROCESSING_DELAY_MS", "0"),
            ("PROCESSING_QUEUE_CAPACITY", "8"),
            ("SIMULATOR_SEED", "42"),
        ]);

        let config = from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(
            config.database.map(|db| db.url).as_deref(),
            Some("postgres://localhost/payments")
        );
        assert_eq!(config.processing.delay_ms, 0);
        assert_eq!(config.processing.queue_capacity, 8);
        assert_eq!(config.processing.simulator_seed, Some(42));
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let mut pairs = SERVER.to_vec();
        pairs.push(("DATABASE_URL", "  "));

        let config = from_lookup(lookup_from(&pairs)).unwrap();

        assert!(config.database.is_none());
    }

    #[test]
    fn missing_port_fails_with_context() {
        let err = from_lookup(lookup_from(&SERVER[1..])).unwrap_err();

        assert!(err.to_string().contains("SERVER_PORT is missing"), "{err}");
    }

    #[test]
    fn unparsable_value_fails_with_context() {
        let mut pairs = SERVER.to_vec();
        pairs.push(("SIMULATOR_SEED", "forty-two"));

        let err = from_lookup(lookup_from(&pairs)).unwrap_err();

        assert!(err.to_string().contains("SIMULATOR_SEED is invalid"), "{err}");
    }
}
