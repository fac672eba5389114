//! MongoDB repository implementation.
//!
//! One collection per entity. Ids are generated by the repository as UUID
//! strings; every write is a single-document operation, so a write is either
//! fully visible or not applied.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use inviteazy_core::invitation::{
    timestamp_now, Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee,
    NewUser, User, UserPatch,
};
use inviteazy_core::storage::{
    EventRepository, InviteeRepository, RepositoryError, Result, UserRepository,
};

use super::documents::{
    event_patch_to_set, invitee_patch_to_set, user_patch_to_set, EventDocument, InviteeDocument,
    UserDocument,
};
use super::error::map_mongo_error;
use crate::config::MongoDbConfig;

const USERS: &str = "users";
const EVENTS: &str = "events";
const INVITEES: &str = "invitees";

/// MongoDB-based repository implementation.
#[derive(Debug, Clone)]
pub struct MongoDbRepository {
    client: Client,
    users: Collection<UserDocument>,
    events: Collection<EventDocument>,
    invitees: Collection<InviteeDocument>,
}

impl MongoDbRepository {
    /// Connects to the server, verifies it is reachable, and creates indexes.
    pub async fn connect(config: &MongoDbConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let repo = Self::new(client, &database);
        repo.init_indexes().await?;
        Ok(repo)
    }

    /// Wraps an existing client. Indexes are assumed to exist.
    pub fn new(client: Client, database: &Database) -> Self {
        Self {
            users: database.collection(USERS),
            events: database.collection(EVENTS),
            invitees: database.collection(INVITEES),
            client,
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn init_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .map_err(|e| map_mongo_error(e, "User", None, "failed to create user indexes"))?;

        for (field, description) in [
            ("event_id", "failed to create invitee event index"),
            ("user_id", "failed to create invitee user index"),
        ] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            self.invitees
                .create_index(IndexModel::builder().keys(keys).build())
                .await
                .map_err(|e| map_mongo_error(e, "Invitee", None, description))?;
        }

        self.events
            .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build())
            .await
            .map_err(|e| map_mongo_error(e, "Event", None, "failed to create event index"))?;

        Ok(())
    }
}

/// Runs a find sorted by creation time and converts every document.
async fn find_sorted<D, T>(
    collection: &Collection<D>,
    filter: Document,
    entity_type: &'static str,
    description: String,
) -> Result<Vec<T>>
where
    D: DeserializeOwned + Unpin + Send + Sync,
    T: TryFrom<D, Error = RepositoryError>,
{
    let cursor = collection
        .find(filter)
        .sort(doc! { "created_at": 1, "_id": 1 })
        .await
        .map_err(|e| map_mongo_error(e, entity_type, None, description.as_str()))?;

    let documents: Vec<D> = cursor
        .try_collect()
        .await
        .map_err(|e| map_mongo_error(e, entity_type, None, description.as_str()))?;

    documents.into_iter().map(T::try_from).collect()
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for MongoDbRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        find_sorted(&self.users, doc! {}, "User", "failed to fetch users".into()).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users
            .find_one(by_id(id))
            .await
            .map_err(|e| {
                map_mongo_error(e, "User", None, format!("failed to fetch user with ID {id}"))
            })?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| map_mongo_error(e, "User", None, "failed to fetch user by email"))?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let user = user.into_user(Uuid::new_v4(), timestamp_now());

        self.users
            .insert_one(UserDocument::from(&user))
            .await
            .map_err(|e| map_mongo_error(e, "User", Some(&user.email), "failed to create user"))?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }

        self.users
            .find_one_and_update(by_id(id), doc! { "$set": user_patch_to_set(&patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                map_mongo_error(
                    e,
                    "User",
                    patch.email.as_deref(),
                    format!("failed to update user with ID {id}"),
                )
            })?
            .map(User::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.delete_one(by_id(id)).await.map_err(|e| {
            map_mongo_error(e, "User", None, format!("failed to delete user with ID {id}"))
        })?;
        Ok(())
    }
}

// ============================================================================
// EventRepository implementation
// ============================================================================

#[async_trait]
impl EventRepository for MongoDbRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        find_sorted(&self.events, doc! {}, "Event", "failed to fetch events".into()).await
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>> {
        find_sorted(
            &self.events,
            doc! { "user_id": user_id.to_string() },
            "Event",
            format!("failed to fetch events for user {user_id}"),
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        self.events
            .find_one(by_id(id))
            .await
            .map_err(|e| {
                map_mongo_error(e, "Event", None, format!("failed to fetch event with ID {id}"))
            })?
            .map(Event::try_from)
            .transpose()
    }

    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(Uuid::new_v4(), timestamp_now());
        let document = EventDocument::from(&event);

        self.events
            .insert_one(&document)
            .await
            .map_err(|e| map_mongo_error(e, "Event", None, "failed to create event"))?;

        // BSON dates hold milliseconds; return what a later read would see.
        Event::try_from(document)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        if patch.is_empty() {
            return EventRepository::find_by_id(self, id).await;
        }

        self.events
            .find_one_and_update(
                by_id(id),
                doc! { "$set": event_patch_to_set(&patch, timestamp_now()) },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                map_mongo_error(e, "Event", None, format!("failed to update event with ID {id}"))
            })?
            .map(Event::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.events.delete_one(by_id(id)).await.map_err(|e| {
            map_mongo_error(e, "Event", None, format!("failed to delete event with ID {id}"))
        })?;
        Ok(())
    }
}

// ============================================================================
// InviteeRepository implementation
// ============================================================================

#[async_trait]
impl InviteeRepository for MongoDbRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        find_sorted(
            &self.invitees,
            doc! {},
            "Invitee",
            "failed to fetch invitees".into(),
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>> {
        self.invitees
            .find_one(by_id(id))
            .await
            .map_err(|e| {
                map_mongo_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to fetch invitee with ID {id}"),
                )
            })?
            .map(Invitee::try_from)
            .transpose()
    }

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Vec<Invitee>> {
        find_sorted(
            &self.invitees,
            doc! { "event_id": event_id.to_string() },
            "Invitee",
            format!("failed to fetch invitees for event {event_id}"),
        )
        .await
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Invitee>> {
        find_sorted(
            &self.invitees,
            doc! { "user_id": user_id.to_string() },
            "Invitee",
            format!("failed to fetch invitations for user {user_id}"),
        )
        .await
    }

    async fn create(&self, invitee: NewInvitee) -> Result<Invitee> {
        let invitee = invitee.into_invitee(Uuid::new_v4(), timestamp_now());

        self.invitees
            .insert_one(InviteeDocument::from(&invitee))
            .await
            .map_err(|e| map_mongo_error(e, "Invitee", None, "failed to create invitee"))?;

        Ok(invitee)
    }

    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        if patch.is_empty() {
            return InviteeRepository::find_by_id(self, id).await;
        }

        self.invitees
            .find_one_and_update(by_id(id), doc! { "$set": invitee_patch_to_set(&patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                map_mongo_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to update invitee with ID {id}"),
                )
            })?
            .map(Invitee::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.invitees.delete_one(by_id(id)).await.map_err(|e| {
            map_mongo_error(
                e,
                "Invitee",
                None,
                format!("failed to delete invitee with ID {id}"),
            )
        })?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee> {
        let updated = self
            .invitees
            .find_one_and_update(by_id(id), doc! { "$set": { "status": status.as_str() } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                map_mongo_error(
                    e,
                    "Invitee",
                    None,
                    format!("failed to update status of invitee with ID {id}"),
                )
            })?;

        match updated {
            Some(document) => Invitee::try_from(document),
            None => Err(RepositoryError::not_found("Invitee", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use inviteazy_core::storage::Repositories;

    use super::*;
    use crate::storage::contract;

    /// Connects to the server named by `MONGODB_TEST_URI`.
    async fn get_test_repositories() -> Option<Repositories> {
        let uri = std::env::var("MONGODB_TEST_URI").ok()?;
        let config = MongoDbConfig {
            uri,
            database: format!("inviteazy_test_{}", Uuid::new_v4().simple()),
        };
        let repo = Arc::new(MongoDbRepository::connect(&config).await.ok()?);
        Some(
            Repositories::builder("mongodb")
                .users(repo.clone())
                .events(repo.clone())
                .invitees(repo)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_mongodb_contract() {
        let Some(repos) = get_test_repositories().await else {
            eprintln!("Skipping test: MONGODB_TEST_URI not set or server unavailable");
            return;
        };

        contract::user_lifecycle(&repos).await;
        contract::event_lifecycle(&repos).await;
        contract::invitee_lifecycle(&repos).await;
        contract::missing_ids(&repos).await;
    }
}
