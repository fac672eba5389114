//! PostgreSQL repository implementation.
//!
//! Implements the repository traits from `inviteazy_core::storage` using a
//! `sqlx::PgPool`. Every write is a single statement with `RETURNING`, so the
//! returned entity is exactly what was committed.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use uuid::Uuid;

use inviteazy_core::invitation::{
    Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee, NewUser, User,
    UserPatch, CHECK_IN_BASE_URL,
};
use inviteazy_core::storage::{
    EventRepository, InviteeRepository, RepositoryError, Result, UserRepository,
};

use super::conversions::{row_to_event, row_to_invitee, row_to_user};
use super::schema;
use crate::config::PostgresConfig;
use crate::storage::sql_error::map_sqlx_error;

/// PostgreSQL-based repository implementation.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Opens a pool from configuration and creates the schema.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let options = match &config.url {
            Some(url) => url.parse::<PgConnectOptions>().map_err(|e| {
                RepositoryError::ConnectionFailed(format!("invalid DATABASE_URL: {e}"))
            })?,
            None => PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.user)
                .password(&config.password)
                .database(&config.database),
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let repo = Self::new(pool);
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Wraps an existing pool. The schema is assumed to exist.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in schema::CREATE_TABLES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, "Schema", None, "failed to create schema"))?;
        }
        Ok(())
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(schema::SELECT_USERS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", None, "failed to fetch users"))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(schema::SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "User", None, format!("failed to fetch user with ID {id}"))
            })?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(schema::SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", None, "failed to fetch user by email"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(schema::INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(&user.phone_number)
            .bind(&user.profile_picture)
            .bind(&user.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", Some(&user.email), "failed to create user"))?;

        row_to_user(&row)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }

        let row = sqlx::query(schema::UPDATE_USER)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.email)
            .bind(&patch.password)
            .bind(patch.role.map(|r| r.as_str()))
            .bind(&patch.phone_number)
            .bind(&patch.profile_picture)
            .bind(&patch.address)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "User",
                    patch.email.as_deref(),
                    format!("failed to update user with ID {id}"),
                )
            })?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_USER)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "User", None, format!("failed to delete user with ID {id}"))
            })?;
        Ok(())
    }
}

// ============================================================================
// EventRepository implementation
// ============================================================================

#[async_trait]
impl EventRepository for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(schema::SELECT_EVENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, "failed to fetch events"))?;

        rows.iter().map(row_to_event).collect()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let rows = sqlx::query(schema::SELECT_EVENTS_BY_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Event",
                    None,
                    format!("failed to fetch events for user {user_id}"),
                )
            })?;

        rows.iter().map(row_to_event).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query(schema::SELECT_EVENT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "Event", None, format!("failed to fetch event with ID {id}"))
            })?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn create(&self, event: NewEvent) -> Result<Event> {
        let row = sqlx::query(schema::INSERT_EVENT)
            .bind(event.user_id)
            .bind(&event.event_name)
            .bind(event.event_datetime)
            .bind(&event.event_location)
            .bind(&event.event_description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, "failed to create event"))?;

        row_to_event(&row)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        if patch.is_empty() {
            return EventRepository::find_by_id(self, id).await;
        }

        let row = sqlx::query(schema::UPDATE_EVENT)
            .bind(id)
            .bind(&patch.event_name)
            .bind(patch.event_datetime)
            .bind(&patch.event_location)
            .bind(&patch.event_description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "Event", None, format!("failed to update event with ID {id}"))
            })?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_EVENT)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "Event", None, format!("failed to delete event with ID {id}"))
            })?;
        Ok(())
    }
}

// ============================================================================
// InviteeRepository implementation
// ============================================================================

#[async_trait]
impl InviteeRepository for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        let rows = sqlx::query(schema::SELECT_INVITEES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, "failed to fetch invitees"))?;

        rows.iter().map(row_to_invitee).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>> {
        let row = sqlx::query(schema::SELECT_INVITEE_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to fetch invitee with ID {id}"),
                )
            })?;

        row.as_ref().map(row_to_invitee).transpose()
    }

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Vec<Invitee>> {
        let rows = sqlx::query(schema::SELECT_INVITEES_BY_EVENT)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to fetch invitees for event {event_id}"),
                )
            })?;

        rows.iter().map(row_to_invitee).collect()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Invitee>> {
        let rows = sqlx::query(schema::SELECT_INVITEES_BY_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to fetch invitations for user {user_id}"),
                )
            })?;

        rows.iter().map(row_to_invitee).collect()
    }

    async fn create(&self, invitee: NewInvitee) -> Result<Invitee> {
        let row = sqlx::query(schema::INSERT_INVITEE)
            .bind(invitee.event_id)
            .bind(invitee.user_id)
            .bind(invitee.status.unwrap_or_default().as_str())
            .bind(&invitee.qr_code)
            .bind(CHECK_IN_BASE_URL)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, "failed to create invitee"))?;

        row_to_invitee(&row)
    }

    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        if patch.is_empty() {
            return InviteeRepository::find_by_id(self, id).await;
        }

        let row = sqlx::query(schema::UPDATE_INVITEE)
            .bind(id)
            .bind(patch.event_id)
            .bind(patch.user_id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(&patch.qr_code)
            .bind(patch.is_checked_in)
            .bind(patch.checked_in_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to update invitee with ID {id}"),
                )
            })?;

        row.as_ref().map(row_to_invitee).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_INVITEE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to delete invitee with ID {id}"),
                )
            })?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee> {
        let row = sqlx::query(schema::UPDATE_INVITEE_STATUS)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to update status of invitee with ID {id}"),
                )
            })?;

        match row {
            Some(row) => row_to_invitee(&row),
            None => Err(RepositoryError::not_found("Invitee", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use inviteazy_core::storage::Repositories;

    use super::*;
    use crate::config::Config;
    use crate::storage::contract;

    /// Connects to the database named by `POSTGRES_TEST_URL`.
    async fn get_test_repositories() -> Option<Repositories> {
        let url = std::env::var("POSTGRES_TEST_URL").ok()?;
        let mut config = Config::from_vars(|_| None).postgres;
        config.url = Some(url);
        let repo = Arc::new(PostgresRepository::connect(&config).await.ok()?);
        Some(
            Repositories::builder("postgres")
                .users(repo.clone())
                .events(repo.clone())
                .invitees(repo)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_postgres_contract() {
        let Some(repos) = get_test_repositories().await else {
            eprintln!("Skipping test: POSTGRES_TEST_URL not set or database unavailable");
            return;
        };

        contract::user_lifecycle(&repos).await;
        contract::event_lifecycle(&repos).await;
        contract::invitee_lifecycle(&repos).await;
        contract::missing_ids(&repos).await;
    }
}
