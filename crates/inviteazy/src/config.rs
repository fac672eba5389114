use std::{env, str::FromStr, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend selector (default: "mariadb")
    pub db_type: String,
    pub postgres: PostgresConfig,
    pub mariadb: MariaDbConfig,
    pub mongodb: MongoDbConfig,
    pub dynamodb: DynamoDbConfig,
    /// Response cache backend, "memory" or "redis" (default: "memory")
    pub cache_backend: String,
    /// Response cache TTL in seconds (default: 360)
    pub cache_ttl_seconds: u64,
    /// Maximum number of in-memory cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Purge cached reads after writes (default: false)
    pub cache_invalidate_on_write: bool,
    /// Redis connection URL (default: "redis://localhost:6379")
    pub redis_url: String,
}

/// Connection parameters for PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Full connection URL. Takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_size: u32,
}

/// Connection parameters for MariaDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MariaDbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_size: u32,
}

/// Connection parameters for MongoDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoDbConfig {
    pub uri: String,
    pub database: String,
}

/// Connection parameters for DynamoDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbConfig {
    pub table_name: String,
    /// Endpoint override for DynamoDB Local.
    pub endpoint_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DB_TYPE` - Backend selector (default: "mariadb")
    /// - `DATABASE_URL` - Full PostgreSQL URL (optional)
    /// - `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_USER`, `POSTGRES_PASSWORD`, `POSTGRES_DB`
    /// - `DB_HOST`, `MDB_PORT`, `MARIADB_USER`, `MARIADB_PASSWORD`, `MARIADB_DATABASE`
    /// - `DB_POOL_SIZE` - Relational pool size (default: 10)
    /// - `MONGODB_URI`, `MONGODB_DATABASE`
    /// - `DYNAMODB_TABLE_NAME`, `DYNAMODB_ENDPOINT`
    /// - `CACHE_BACKEND` - "memory" or "redis" (default: "memory")
    /// - `CACHE_TTL_SECONDS` - Response cache TTL (default: 360)
    /// - `CACHE_MAX_ENTRIES` - In-memory cache capacity (default: 10,000)
    /// - `CACHE_INVALIDATE_ON_WRITE` - Purge cached reads on writes (default: false)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        let pool_size = parse_or(&lookup, "DB_POOL_SIZE", 10);

        Self {
            db_type: string_or("DB_TYPE", "mariadb"),
            postgres: PostgresConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                host: string_or("POSTGRES_HOST", "localhost"),
                port: parse_or(&lookup, "POSTGRES_PORT", 5432),
                user: string_or("POSTGRES_USER", "postgres"),
                password: string_or("POSTGRES_PASSWORD", ""),
                database: string_or("POSTGRES_DB", "inviteazy"),
                pool_size,
            },
            mariadb: MariaDbConfig {
                host: string_or("DB_HOST", "localhost"),
                port: parse_or(&lookup, "MDB_PORT", 3306),
                user: string_or("MARIADB_USER", "root"),
                password: string_or("MARIADB_PASSWORD", ""),
                database: string_or("MARIADB_DATABASE", "inviteazy"),
                pool_size,
            },
            mongodb: MongoDbConfig {
                uri: string_or("MONGODB_URI", "mongodb://localhost:27017"),
                database: string_or("MONGODB_DATABASE", "inviteazy"),
            },
            dynamodb: DynamoDbConfig {
                table_name: string_or("DYNAMODB_TABLE_NAME", "inviteazy"),
                endpoint_url: lookup("DYNAMODB_ENDPOINT").filter(|url| !url.is_empty()),
            },
            cache_backend: string_or("CACHE_BACKEND", "memory"),
            cache_ttl_seconds: parse_or(&lookup, "CACHE_TTL_SECONDS", 360),
            cache_max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", 10_000),
            cache_invalidate_on_write: lookup("CACHE_INVALIDATE_ON_WRITE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            redis_url: string_or("REDIS_URL", "redis://localhost:6379"),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]);

        assert_eq!(config.db_type, "mariadb");
        assert_eq!(config.mariadb.port, 3306);
        assert_eq!(config.mariadb.pool_size, 10);
        assert_eq!(config.postgres.url, None);
        assert_eq!(config.mongodb.uri, "mongodb://localhost:27017");
        assert_eq!(config.mongodb.database, "inviteazy");
        assert_eq!(config.dynamodb.table_name, "inviteazy");
        assert_eq!(config.cache_backend, "memory");
        assert_eq!(config.cache_ttl_seconds, 360);
        assert_eq!(config.cache_max_entries, 10_000);
        assert!(!config.cache_invalidate_on_write);
        assert_eq!(config.redis_url, "redis://localhost:6379");
    }

    #[test]
    fn test_cache_ttl_conversion() {
        let config = config_from(&[("CACHE_TTL_SECONDS", "600")]);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DB_TYPE", "postgres"),
            ("DATABASE_URL", "postgres://app@db/inviteazy"),
            ("DB_HOST", "maria.internal"),
            ("MDB_PORT", "3307"),
            ("DB_POOL_SIZE", "25"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
            ("CACHE_INVALIDATE_ON_WRITE", "true"),
        ]);

        assert_eq!(config.db_type, "postgres");
        assert_eq!(
            config.postgres.url.as_deref(),
            Some("postgres://app@db/inviteazy")
        );
        assert_eq!(config.mariadb.host, "maria.internal");
        assert_eq!(config.mariadb.port, 3307);
        assert_eq!(config.postgres.pool_size, 25);
        assert_eq!(config.mariadb.pool_size, 25);
        assert_eq!(
            config.dynamodb.endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert!(config.cache_invalidate_on_write);
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let config = config_from(&[("CACHE_TTL_SECONDS", "soon"), ("MDB_PORT", "-1")]);
        assert_eq!(config.cache_ttl_seconds, 360);
        assert_eq!(config.mariadb.port, 3306);
    }

    #[test]
    fn test_empty_urls_are_ignored() {
        let config = config_from(&[("DATABASE_URL", ""), ("DYNAMODB_ENDPOINT", "")]);
        assert_eq!(config.postgres.url, None);
        assert_eq!(config.dynamodb.endpoint_url, None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
