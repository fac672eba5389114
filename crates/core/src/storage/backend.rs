//! Backend selection.
//!
//! The selector is parsed before anything connects, so a bad value stops the
//! process at startup instead of surfacing on the first request.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Storage families a process can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Postgres,
    MariaDb,
    MongoDb,
    DynamoDb,
    InMemory,
}

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Postgres,
        BackendKind::MariaDb,
        BackendKind::MongoDb,
        BackendKind::DynamoDb,
        BackendKind::InMemory,
    ];

    /// Canonical selector value, also the name of the cargo feature that
    /// compiles the backend in.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgres",
            BackendKind::MariaDb => "mariadb",
            BackendKind::MongoDb => "mongodb",
            BackendKind::DynamoDb => "dynamodb",
            BackendKind::InMemory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = StorageConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "mariadb" | "mysql" => Ok(BackendKind::MariaDb),
            "mongodb" | "mongo" => Ok(BackendKind::MongoDb),
            "dynamodb" => Ok(BackendKind::DynamoDb),
            "memory" | "inmemory" => Ok(BackendKind::InMemory),
            _ => Err(StorageConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Configuration errors detected at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageConfigError {
    #[error(
        "Unsupported DB_TYPE: {0} (expected one of postgres, mariadb, mongodb, dynamodb, memory)"
    )]
    UnsupportedBackend(String),
    #[error("The {0} backend is not compiled in (enable the `{0}` feature)")]
    BackendNotCompiled(BackendKind),
    #[error("Unsupported CACHE_BACKEND: {0} (expected memory or redis)")]
    UnsupportedCache(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.as_str().parse::<BackendKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("postgresql".parse(), Ok(BackendKind::Postgres));
        assert_eq!("mysql".parse(), Ok(BackendKind::MariaDb));
        assert_eq!("Mongo".parse(), Ok(BackendKind::MongoDb));
        assert_eq!(" inmemory ".parse(), Ok(BackendKind::InMemory));
    }

    #[test]
    fn test_parse_unsupported() {
        assert_eq!(
            "oracle".parse::<BackendKind>(),
            Err(StorageConfigError::UnsupportedBackend("oracle".to_string()))
        );
        assert!("".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            StorageConfigError::BackendNotCompiled(BackendKind::DynamoDb).to_string(),
            "The dynamodb backend is not compiled in (enable the `dynamodb` feature)"
        );
    }
}
