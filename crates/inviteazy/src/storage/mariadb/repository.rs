//! MariaDB repository implementation.
//!
//! Implements the repository traits from `inviteazy_core::storage` using a
//! `sqlx::MySqlPool`. MariaDB has no `RETURNING` on `UPDATE`, so each write
//! runs in a transaction that reads the row back before committing.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, Transaction};
use uuid::Uuid;

use inviteazy_core::invitation::{
    timestamp_now, Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee,
    NewUser, User, UserPatch,
};
use inviteazy_core::storage::{
    EventRepository, InviteeRepository, RepositoryError, Result, UserRepository,
};

use super::conversions::{row_to_event, row_to_invitee, row_to_user};
use super::schema;
use crate::config::MariaDbConfig;
use crate::storage::sql_error::map_sqlx_error;

/// MariaDB-based repository implementation.
#[derive(Debug, Clone)]
pub struct MariaDbRepository {
    pool: MySqlPool,
}

impl MariaDbRepository {
    /// Opens a pool from configuration and creates the schema.
    pub async fn connect(config: &MariaDbConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let repo = Self::new(pool);
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Wraps an existing pool. The schema is assumed to exist.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
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

    async fn begin(
        &self,
        entity_type: &'static str,
        description: &str,
    ) -> Result<Transaction<'static, MySql>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, entity_type, None, description))
    }
}

async fn commit(
    tx: Transaction<'static, MySql>,
    entity_type: &'static str,
    description: &str,
) -> Result<()> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error(e, entity_type, None, description))
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for MariaDbRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(schema::SELECT_USERS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", None, "failed to fetch users"))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(schema::SELECT_USER_BY_ID)
            .bind(id.to_string())
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
        let user = user.into_user(Uuid::new_v4(), timestamp_now());

        sqlx::query(schema::INSERT_USER)
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(&user.phone_number)
            .bind(&user.profile_picture)
            .bind(&user.address)
            .bind(user.created_at.naive_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", Some(&user.email), "failed to create user"))?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }

        let description = format!("failed to update user with ID {id}");
        let mut tx = self.begin("User", &description).await?;

        sqlx::query(schema::UPDATE_USER)
            .bind(&patch.name)
            .bind(&patch.email)
            .bind(&patch.password)
            .bind(patch.role.map(|r| r.as_str()))
            .bind(&patch.phone_number)
            .bind(&patch.profile_picture)
            .bind(&patch.address)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "User", patch.email.as_deref(), description.as_str()))?;

        let row = sqlx::query(schema::SELECT_USER_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "User", None, description.as_str()))?;

        commit(tx, "User", &description).await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_USER)
            .bind(id.to_string())
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
impl EventRepository for MariaDbRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(schema::SELECT_EVENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, "failed to fetch events"))?;

        rows.iter().map(row_to_event).collect()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let rows = sqlx::query(schema::SELECT_EVENTS_BY_USER)
            .bind(user_id.to_string())
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
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_sqlx_error(e, "Event", None, format!("failed to fetch event with ID {id}"))
            })?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(Uuid::new_v4(), timestamp_now());
        let description = "failed to create event";
        let mut tx = self.begin("Event", description).await?;

        sqlx::query(schema::INSERT_EVENT)
            .bind(event.id.to_string())
            .bind(event.user_id.to_string())
            .bind(&event.event_name)
            .bind(event.event_datetime.naive_utc())
            .bind(&event.event_location)
            .bind(&event.event_description)
            .bind(event.created_at.naive_utc())
            .bind(event.updated_at.naive_utc())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, description))?;

        // Read back so event_datetime carries the column's precision.
        let row = sqlx::query(schema::SELECT_EVENT_BY_ID)
            .bind(event.id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, description))?;

        commit(tx, "Event", description).await?;
        row_to_event(&row)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        if patch.is_empty() {
            return EventRepository::find_by_id(self, id).await;
        }

        let description = format!("failed to update event with ID {id}");
        let mut tx = self.begin("Event", &description).await?;

        sqlx::query(schema::UPDATE_EVENT)
            .bind(&patch.event_name)
            .bind(patch.event_datetime.map(|d| d.naive_utc()))
            .bind(&patch.event_location)
            .bind(&patch.event_description)
            .bind(timestamp_now().naive_utc())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, description.as_str()))?;

        let row = sqlx::query(schema::SELECT_EVENT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Event", None, description.as_str()))?;

        commit(tx, "Event", &description).await?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_EVENT)
            .bind(id.to_string())
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
impl InviteeRepository for MariaDbRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        let rows = sqlx::query(schema::SELECT_INVITEES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, "failed to fetch invitees"))?;

        rows.iter().map(row_to_invitee).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>> {
        let row = sqlx::query(schema::SELECT_INVITEE_BY_ID)
            .bind(id.to_string())
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
            .bind(event_id.to_string())
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
            .bind(user_id.to_string())
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
        let invitee = invitee.into_invitee(Uuid::new_v4(), timestamp_now());

        sqlx::query(schema::INSERT_INVITEE)
            .bind(invitee.id.to_string())
            .bind(invitee.event_id.to_string())
            .bind(invitee.user_id.to_string())
            .bind(invitee.status.as_str())
            .bind(&invitee.qr_code)
            .bind(invitee.is_checked_in)
            .bind(invitee.checked_in_at.map(|d| d.naive_utc()))
            .bind(invitee.created_at.naive_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, "failed to create invitee"))?;

        Ok(invitee)
    }

    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        if patch.is_empty() {
            return InviteeRepository::find_by_id(self, id).await;
        }

        let description = format!("failed to update invitee with ID {id}");
        let mut tx = self.begin("Invitee", &description).await?;

        sqlx::query(schema::UPDATE_INVITEE)
            .bind(patch.event_id.map(|v| v.to_string()))
            .bind(patch.user_id.map(|v| v.to_string()))
            .bind(patch.status.map(|s| s.as_str()))
            .bind(&patch.qr_code)
            .bind(patch.is_checked_in)
            .bind(patch.checked_in_at.map(|d| d.naive_utc()))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, description.as_str()))?;

        let row = sqlx::query(schema::SELECT_INVITEE_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, description.as_str()))?;

        commit(tx, "Invitee", &description).await?;
        row.as_ref().map(row_to_invitee).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(schema::DELETE_INVITEE)
            .bind(id.to_string())
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
        let description = format!("failed to update status of invitee with ID {id}");
        let mut tx = self.begin("Invitee", &description).await?;

        sqlx::query(schema::UPDATE_INVITEE_STATUS)
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, description.as_str()))?;

        let row = sqlx::query(schema::SELECT_INVITEE_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Invitee", None, description.as_str()))?;

        commit(tx, "Invitee", &description).await?;
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

    /// Connects using `MARIADB_TEST_HOST` and the regular `MARIADB_*` settings.
    async fn get_test_repositories() -> Option<Repositories> {
        let host = std::env::var("MARIADB_TEST_HOST").ok()?;
        let mut config = Config::from_env().mariadb;
        config.host = host;
        let repo = Arc::new(MariaDbRepository::connect(&config).await.ok()?);
        Some(
            Repositories::builder("mariadb")
                .users(repo.clone())
                .events(repo.clone())
                .invitees(repo)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_mariadb_contract() {
        let Some(repos) = get_test_repositories().await else {
            eprintln!("Skipping test: MARIADB_TEST_HOST not set or database unavailable");
            return;
        };

        contract::user_lifecycle(&repos).await;
        contract::event_lifecycle(&repos).await;
        contract::invitee_lifecycle(&repos).await;
        contract::missing_ids(&repos).await;
    }
}
