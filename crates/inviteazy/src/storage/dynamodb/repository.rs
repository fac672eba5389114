//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `inviteazy_core::storage` using a
//! single DynamoDB table. Email uniqueness is enforced with a marker item
//! written in the same transaction as the user.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{Delete, Put, ReturnValue, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;
use uuid::Uuid;

use inviteazy_core::invitation::{
    timestamp_now, Event, EventPatch, Invitee, InviteePatch, InviteeStatus, NewEvent, NewInvitee,
    NewUser, User, UserPatch,
};
use inviteazy_core::storage::{
    EventRepository, InviteeRepository, RepositoryError, Result, UserRepository,
};

use super::conversions::{
    email_marker_item, email_marker_owner, event_patch_update, event_to_item,
    invitee_patch_update, invitee_to_item, item_to_event, item_to_invitee, item_to_user,
    primary_key, s, user_patch_update, user_to_item, Item, UpdateExpression, ENTITY_TYPE_EVENT,
    ENTITY_TYPE_INVITEE, ENTITY_TYPE_USER,
};
use super::error::{
    failed_conditions, is_conditional_check_failed, map_build_error, map_sdk_error,
};
use super::keys;
use super::table::ensure_table;
use crate::config::DynamoDbConfig;

/// DynamoDB-based repository implementation.
///
/// Provides async access to DynamoDB storage for all entity types.
#[derive(Debug, Clone)]
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds a client from the AWS default credential chain and ensures the
    /// table exists.
    ///
    /// `endpoint_url` overrides the service endpoint, for DynamoDB Local.
    pub async fn connect(config: &DynamoDbConfig) -> Result<Self> {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(builder.build());

        ensure_table(&client, &config.table_name).await?;
        Ok(Self::new(client, &config.table_name))
    }

    async fn get_item(
        &self,
        pk: String,
        entity_type: &'static str,
        description: String,
    ) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(pk)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, entity_type, description))?;

        Ok(output.item)
    }

    async fn put_new(&self, item: Item, entity_type: &'static str, description: &str) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| map_sdk_error(e, entity_type, description))?;

        Ok(())
    }

    async fn delete_item(&self, pk: String, entity_type: &'static str, description: String) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(pk)))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, entity_type, description))?;

        Ok(())
    }

    /// Applies an update to an existing item and returns the new item, or
    /// `None` when no item has the key.
    async fn update_existing(
        &self,
        pk: String,
        update: UpdateExpression,
        entity_type: &'static str,
        description: String,
    ) -> Result<Option<Item>> {
        let (expression, names, values) = update.into_parts();
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(pk)))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(PK)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output.attributes),
            Err(err) if is_conditional_check_failed(&err) => Ok(None),
            Err(err) => Err(map_sdk_error(err, entity_type, description)),
        }
    }

    /// Reads every item of one entity type, following pagination.
    async fn scan_entities(
        &self,
        entity_type: &'static str,
        description: &str,
    ) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("entityType = :type")
                .expression_attribute_values(":type", s(entity_type))
                .consistent_read(true)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| map_sdk_error(e, entity_type, description))?;

            items.extend(output.items.unwrap_or_default());
            start_key = output.last_evaluated_key;
            if start_key.is_none() {
                return Ok(items);
            }
        }
    }

    /// Queries an index partition for sort keys with a prefix, in sort-key
    /// order.
    async fn query_index(
        &self,
        index: &str,
        pk: String,
        sk_prefix: &str,
        entity_type: &'static str,
        description: String,
    ) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(index)
                .key_condition_expression("#pk = :pk AND begins_with(#sk, :prefix)")
                .expression_attribute_names("#pk", format!("{index}PK"))
                .expression_attribute_names("#sk", format!("{index}SK"))
                .expression_attribute_values(":pk", s(pk.clone()))
                .expression_attribute_values(":prefix", s(sk_prefix))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| map_sdk_error(e, entity_type, description.as_str()))?;

            items.extend(output.items.unwrap_or_default());
            start_key = output.last_evaluated_key;
            if start_key.is_none() {
                return Ok(items);
            }
        }
    }

    async fn transact(
        &self,
        items: Vec<TransactWriteItem>,
        entity_type: &'static str,
        description: &str,
    ) -> std::result::Result<(), TransactFailure> {
        match self
            .client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let failed = failed_conditions(&err);
                if failed.is_empty() {
                    Err(TransactFailure::Error(map_sdk_error(
                        err,
                        entity_type,
                        description,
                    )))
                } else {
                    Err(TransactFailure::Conditions(failed))
                }
            }
        }
    }

    fn transact_put(&self, item: Item, condition: &str, description: &str) -> Result<TransactWriteItem> {
        let put = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(condition)
            .build()
            .map_err(|e| map_build_error(e, description))?;
        Ok(TransactWriteItem::builder().put(put).build())
    }

    fn transact_delete(&self, pk: String, description: &str) -> Result<TransactWriteItem> {
        let delete = Delete::builder()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(pk)))
            .build()
            .map_err(|e| map_build_error(e, description))?;
        Ok(TransactWriteItem::builder().delete(delete).build())
    }

    fn transact_update(
        &self,
        pk: String,
        update: UpdateExpression,
        description: &str,
    ) -> Result<TransactWriteItem> {
        let (expression, names, values) = update.into_parts();
        let update = Update::builder()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(pk)))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(PK)")
            .build()
            .map_err(|e| map_build_error(e, description))?;
        Ok(TransactWriteItem::builder().update(update).build())
    }
}

/// Outcome of a cancelled or failed transaction.
enum TransactFailure {
    /// Indexes of the items whose condition did not hold.
    Conditions(Vec<usize>),
    Error(RepositoryError),
}

fn convert_all<T>(
    items: Vec<Item>,
    convert: impl Fn(&Item) -> Result<T>,
) -> Result<Vec<T>> {
    items.iter().map(convert).collect()
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for DynamoDbRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        let items = self
            .scan_entities(ENTITY_TYPE_USER, "failed to fetch users")
            .await?;
        let mut users = convert_all(items, item_to_user)?;
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.get_item(
            keys::user_pk(id),
            "User",
            format!("failed to fetch user with ID {id}"),
        )
        .await?
        .as_ref()
        .map(item_to_user)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let marker = self
            .get_item(
                keys::email_pk(email),
                "User",
                "failed to fetch user by email".to_string(),
            )
            .await?;

        match marker {
            Some(marker) => {
                let user = UserRepository::find_by_id(self, email_marker_owner(&marker)?).await?;
                Ok(user.filter(|u| u.email == email))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let user = user.into_user(Uuid::new_v4(), timestamp_now());
        let description = "failed to create user";

        let items = vec![
            self.transact_put(user_to_item(&user), "attribute_not_exists(PK)", description)?,
            self.transact_put(
                email_marker_item(&user.email, user.id),
                "attribute_not_exists(PK)",
                description,
            )?,
        ];

        match self.transact(items, "User", description).await {
            Ok(()) => Ok(user),
            Err(TransactFailure::Conditions(_)) => Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email,
            }),
            Err(TransactFailure::Error(err)) => Err(err),
        }
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }

        let description = format!("failed to update user with ID {id}");
        let Some(current) = UserRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let new_email = patch.email.clone().filter(|email| *email != current.email);
        let Some(new_email) = new_email else {
            return self
                .update_existing(keys::user_pk(id), user_patch_update(&patch), "User", description)
                .await?
                .as_ref()
                .map(item_to_user)
                .transpose();
        };

        // Moving the email also moves its marker.
        let items = vec![
            self.transact_update(keys::user_pk(id), user_patch_update(&patch), &description)?,
            self.transact_delete(keys::email_pk(&current.email), &description)?,
            self.transact_put(
                email_marker_item(&new_email, id),
                "attribute_not_exists(PK)",
                &description,
            )?,
        ];

        match self.transact(items, "User", &description).await {
            Ok(()) => UserRepository::find_by_id(self, id).await,
            Err(TransactFailure::Conditions(failed)) if failed.contains(&2) => {
                Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: new_email,
                })
            }
            Err(TransactFailure::Conditions(_)) => Ok(None),
            Err(TransactFailure::Error(err)) => Err(err),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let description = format!("failed to delete user with ID {id}");
        let Some(current) = UserRepository::find_by_id(self, id).await? else {
            return Ok(());
        };

        let items = vec![
            self.transact_delete(keys::user_pk(id), &description)?,
            self.transact_delete(keys::email_pk(&current.email), &description)?,
        ];

        match self.transact(items, "User", &description).await {
            Ok(()) => Ok(()),
            Err(TransactFailure::Conditions(_)) => Ok(()),
            Err(TransactFailure::Error(err)) => Err(err),
        }
    }
}

// ============================================================================
// EventRepository implementation
// ============================================================================

#[async_trait]
impl EventRepository for DynamoDbRepository {
    async fn find_all(&self) -> Result<Vec<Event>> {
        let items = self
            .scan_entities(ENTITY_TYPE_EVENT, "failed to fetch events")
            .await?;
        let mut events = convert_all(items, item_to_event)?;
        events.sort_by_key(|e| (e.created_at, e.id));
        Ok(events)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let items = self
            .query_index(
                "GSI1",
                keys::event_gsi1_pk(user_id),
                keys::EVENT_PREFIX,
                "Event",
                format!("failed to fetch events for user {user_id}"),
            )
            .await?;
        convert_all(items, item_to_event)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        self.get_item(
            keys::event_pk(id),
            "Event",
            format!("failed to fetch event with ID {id}"),
        )
        .await?
        .as_ref()
        .map(item_to_event)
        .transpose()
    }

    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(Uuid::new_v4(), timestamp_now());
        let item = event_to_item(&event);

        self.put_new(item.clone(), "Event", "failed to create event")
            .await?;

        // Stored timestamps hold milliseconds; return what a later read would see.
        item_to_event(&item)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        if patch.is_empty() {
            return EventRepository::find_by_id(self, id).await;
        }

        self.update_existing(
            keys::event_pk(id),
            event_patch_update(&patch, timestamp_now()),
            "Event",
            format!("failed to update event with ID {id}"),
        )
        .await?
        .as_ref()
        .map(item_to_event)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_item(
            keys::event_pk(id),
            "Event",
            format!("failed to delete event with ID {id}"),
        )
        .await
    }
}

// ============================================================================
// InviteeRepository implementation
// ============================================================================

#[async_trait]
impl InviteeRepository for DynamoDbRepository {
    async fn find_all(&self) -> Result<Vec<Invitee>> {
        let items = self
            .scan_entities(ENTITY_TYPE_INVITEE, "failed to fetch invitees")
            .await?;
        let mut invitees = convert_all(items, item_to_invitee)?;
        invitees.sort_by_key(|i| (i.created_at, i.id));
        Ok(invitees)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitee>> {
        self.get_item(
            keys::invitee_pk(id),
            "Invitee",
            format!("failed to fetch invitee with ID {id}"),
        )
        .await?
        .as_ref()
        .map(item_to_invitee)
        .transpose()
    }

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Vec<Invitee>> {
        let items = self
            .query_index(
                "GSI1",
                keys::invitee_gsi1_pk(event_id),
                keys::INVITEE_PREFIX,
                "Invitee",
                format!("failed to fetch invitees for event {event_id}"),
            )
            .await?;
        convert_all(items, item_to_invitee)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Invitee>> {
        let items = self
            .query_index(
                "GSI2",
                keys::invitee_gsi2_pk(user_id),
                keys::INVITEE_PREFIX,
                "Invitee",
                format!("failed to fetch invitations for user {user_id}"),
            )
            .await?;
        convert_all(items, item_to_invitee)
    }

    async fn create(&self, invitee: NewInvitee) -> Result<Invitee> {
        let invitee = invitee.into_invitee(Uuid::new_v4(), timestamp_now());

        self.put_new(invitee_to_item(&invitee), "Invitee", "failed to create invitee")
            .await?;

        Ok(invitee)
    }

    async fn update(&self, id: Uuid, patch: InviteePatch) -> Result<Option<Invitee>> {
        if patch.is_empty() {
            return InviteeRepository::find_by_id(self, id).await;
        }

        self.update_existing(
            keys::invitee_pk(id),
            invitee_patch_update(&patch),
            "Invitee",
            format!("failed to update invitee with ID {id}"),
        )
        .await?
        .as_ref()
        .map(item_to_invitee)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_item(
            keys::invitee_pk(id),
            "Invitee",
            format!("failed to delete invitee with ID {id}"),
        )
        .await
    }

    async fn update_status(&self, id: Uuid, status: InviteeStatus) -> Result<Invitee> {
        let updated = self
            .update_existing(
                keys::invitee_pk(id),
                UpdateExpression::default().set("status", s(status.as_str())),
                "Invitee",
                format!("failed to update status of invitee with ID {id}"),
            )
            .await?;

        match updated {
            Some(item) => item_to_invitee(&item),
            None => Err(RepositoryError::not_found("Invitee", id)),
        }
    }
}
