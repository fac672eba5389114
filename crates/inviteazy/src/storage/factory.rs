//! Backend selection and connection lifecycle.
//!
//! [`parse_selector`] validates `DB_TYPE` without touching the network.
//! [`Storage::connect`] then opens the selected store once and wires all
//! three repositories to it. The connection is owned by a [`StorageHandle`]
//! that is closed explicitly on shutdown.

use std::sync::Arc;

use thiserror::Error;

use inviteazy_core::storage::{
    BackendKind, EventRepository, InviteeRepository, Repositories, RepositoryError,
    StorageConfigError, UserRepository,
};

use super::inmemory::InMemoryRepository;
use crate::config::Config;

/// Errors raised while setting up storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Config(#[from] StorageConfigError),
    #[error("Failed to connect to {backend} storage: {source}")]
    Connect {
        backend: BackendKind,
        #[source]
        source: RepositoryError,
    },
}

/// Returns true when the backend's cargo feature is enabled.
pub fn is_compiled(kind: BackendKind) -> bool {
    match kind {
        BackendKind::Postgres => cfg!(feature = "postgres"),
        BackendKind::MariaDb => cfg!(feature = "mariadb"),
        BackendKind::MongoDb => cfg!(feature = "mongodb"),
        BackendKind::DynamoDb => cfg!(feature = "dynamodb"),
        BackendKind::InMemory => true,
    }
}

/// Parses a backend selector and checks that the backend is compiled in.
pub fn parse_selector(selector: &str) -> Result<BackendKind, StorageConfigError> {
    let kind: BackendKind = selector.parse()?;
    if !is_compiled(kind) {
        return Err(StorageConfigError::BackendNotCompiled(kind));
    }
    Ok(kind)
}

/// The connection resource behind a set of repositories.
#[derive(Debug)]
pub enum StorageHandle {
    InMemory,
    #[cfg(feature = "postgres")]
    Postgres(sqlx::PgPool),
    #[cfg(feature = "mariadb")]
    MariaDb(sqlx::MySqlPool),
    #[cfg(feature = "mongodb")]
    MongoDb(mongodb::Client),
    /// The AWS client holds no connection that needs closing.
    #[cfg(feature = "dynamodb")]
    DynamoDb,
}

impl StorageHandle {
    pub fn kind(&self) -> BackendKind {
        match self {
            StorageHandle::InMemory => BackendKind::InMemory,
            #[cfg(feature = "postgres")]
            StorageHandle::Postgres(_) => BackendKind::Postgres,
            #[cfg(feature = "mariadb")]
            StorageHandle::MariaDb(_) => BackendKind::MariaDb,
            #[cfg(feature = "mongodb")]
            StorageHandle::MongoDb(_) => BackendKind::MongoDb,
            #[cfg(feature = "dynamodb")]
            StorageHandle::DynamoDb => BackendKind::DynamoDb,
        }
    }

    /// Releases the connection. Waits for in-flight queries to finish.
    pub async fn close(self) {
        let kind = self.kind();
        match self {
            StorageHandle::InMemory => {}
            #[cfg(feature = "postgres")]
            StorageHandle::Postgres(pool) => pool.close().await,
            #[cfg(feature = "mariadb")]
            StorageHandle::MariaDb(pool) => pool.close().await,
            #[cfg(feature = "mongodb")]
            StorageHandle::MongoDb(client) => client.shutdown().await,
            #[cfg(feature = "dynamodb")]
            StorageHandle::DynamoDb => {}
        }
        tracing::info!(backend = %kind, "Storage closed");
    }
}

/// One consistent set of repositories and the handle they share.
#[derive(Debug)]
pub struct Storage {
    pub repositories: Repositories,
    handle: StorageHandle,
}

fn wire<R>(kind: BackendKind, repo: R) -> Repositories
where
    R: UserRepository + EventRepository + InviteeRepository + 'static,
{
    let repo = Arc::new(repo);
    Repositories::builder(kind.as_str())
        .users(repo.clone())
        .events(repo.clone())
        .invitees(repo)
        .build()
}

impl Storage {
    /// Storage backed by a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self {
            repositories: wire(BackendKind::InMemory, InMemoryRepository::new()),
            handle: StorageHandle::InMemory,
        }
    }

    /// Parses `selector` and connects. Fails before connecting when the
    /// selector is not supported.
    pub async fn from_selector(selector: &str, config: &Config) -> Result<Self, StorageError> {
        let kind = parse_selector(selector)?;
        Self::connect(kind, config).await
    }

    /// Connects to the selected backend and wires its repositories.
    pub async fn connect(kind: BackendKind, config: &Config) -> Result<Self, StorageError> {
        let connect_error = |source| StorageError::Connect {
            backend: kind,
            source,
        };

        let storage = match kind {
            BackendKind::InMemory => Self::in_memory(),
            #[cfg(feature = "postgres")]
            BackendKind::Postgres => {
                let repo = super::postgres::PostgresRepository::connect(&config.postgres)
                    .await
                    .map_err(connect_error)?;
                Self {
                    handle: StorageHandle::Postgres(repo.pool().clone()),
                    repositories: wire(kind, repo),
                }
            }
            #[cfg(feature = "mariadb")]
            BackendKind::MariaDb => {
                let repo = super::mariadb::MariaDbRepository::connect(&config.mariadb)
                    .await
                    .map_err(connect_error)?;
                Self {
                    handle: StorageHandle::MariaDb(repo.pool().clone()),
                    repositories: wire(kind, repo),
                }
            }
            #[cfg(feature = "mongodb")]
            BackendKind::MongoDb => {
                let repo = super::mongodb::MongoDbRepository::connect(&config.mongodb)
                    .await
                    .map_err(connect_error)?;
                Self {
                    handle: StorageHandle::MongoDb(repo.client().clone()),
                    repositories: wire(kind, repo),
                }
            }
            #[cfg(feature = "dynamodb")]
            BackendKind::DynamoDb => {
                let repo = super::dynamodb::DynamoDbRepository::connect(&config.dynamodb)
                    .await
                    .map_err(connect_error)?;
                Self {
                    handle: StorageHandle::DynamoDb,
                    repositories: wire(kind, repo),
                }
            }
            #[allow(unreachable_patterns)]
            other => return Err(StorageConfigError::BackendNotCompiled(other).into()),
        };

        tracing::info!(backend = %kind, "Storage connected");
        Ok(storage)
    }

    pub fn kind(&self) -> BackendKind {
        self.handle.kind()
    }

    /// Closes the underlying connection.
    pub async fn close(self) {
        self.handle.close().await;
    }
}

#[cfg(test)]
mod tests {
    use inviteazy_core::invitation::{NewUser, UserRole};

    use super::*;

    #[test]
    fn test_unsupported_selector_fails_before_connecting() {
        assert_eq!(
            parse_selector("oracle"),
            Err(StorageConfigError::UnsupportedBackend("oracle".to_string()))
        );
        assert!(parse_selector("").is_err());
    }

    #[test]
    fn test_selector_accepts_aliases() {
        assert_eq!(parse_selector("memory"), Ok(BackendKind::InMemory));
        assert_eq!(parse_selector(" InMemory "), Ok(BackendKind::InMemory));
    }

    #[test]
    fn test_compiled_backends_follow_features() {
        assert!(is_compiled(BackendKind::InMemory));
        assert_eq!(is_compiled(BackendKind::Postgres), cfg!(feature = "postgres"));
        assert_eq!(is_compiled(BackendKind::MariaDb), cfg!(feature = "mariadb"));
        assert_eq!(is_compiled(BackendKind::MongoDb), cfg!(feature = "mongodb"));
        assert_eq!(is_compiled(BackendKind::DynamoDb), cfg!(feature = "dynamodb"));

        for kind in BackendKind::ALL {
            if !is_compiled(kind) {
                assert_eq!(
                    parse_selector(kind.as_str()),
                    Err(StorageConfigError::BackendNotCompiled(kind))
                );
            }
        }
    }

    #[tokio::test]
    async fn test_from_selector_reports_config_errors() {
        let config = Config::from_vars(|_| None);
        let err = Storage::from_selector("cassandra", &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Config(StorageConfigError::UnsupportedBackend(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_storage_connects_and_closes() {
        let config = Config::from_vars(|_| None);
        let storage = Storage::from_selector("memory", &config).await.unwrap();
        assert_eq!(storage.kind(), BackendKind::InMemory);

        let user = storage
            .repositories
            .users
            .create(NewUser {
                name: "Dara".to_string(),
                email: "dara@example.com".to_string(),
                password: "hashed".to_string(),
                role: UserRole::Public,
                phone_number: None,
                profile_picture: None,
                address: None,
            })
            .await
            .unwrap();
        assert_eq!(
            storage.repositories.users.find_by_id(user.id).await.unwrap(),
            Some(user)
        );

        storage.close().await;
    }
}
