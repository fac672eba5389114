//! Table bootstrap for the single-table layout.
//!
//! Creates the table with its two indexes when it does not exist yet and
//! waits until it is active.

use std::time::Duration;

use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;

use inviteazy_core::storage::Result;

use super::error::{map_build_error, map_connection_error, map_sdk_error};

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLLS: u32 = 120;

fn key(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| map_build_error(e, "failed to build key schema"))
}

fn string_attribute(name: &str) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| map_build_error(e, "failed to build attribute definition"))
}

fn index(name: &str, pk: &str, sk: &str) -> Result<GlobalSecondaryIndex> {
    GlobalSecondaryIndex::builder()
        .index_name(name)
        .key_schema(key(pk, KeyType::Hash)?)
        .key_schema(key(sk, KeyType::Range)?)
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()
        .map_err(|e| map_build_error(e, "failed to build index definition"))
}

/// Returns the table status, or `None` when the table does not exist.
async fn table_status(client: &Client, table_name: &str) -> Result<Option<TableStatus>> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(output) => Ok(output.table().and_then(|t| t.table_status()).cloned()),
        Err(err)
            if matches!(
                err.as_service_error(),
                Some(DescribeTableError::ResourceNotFoundException(_))
            ) =>
        {
            Ok(None)
        }
        Err(err) => Err(map_sdk_error(err, "Table", "failed to describe table")),
    }
}

async fn create_table(client: &Client, table_name: &str) -> Result<()> {
    let mut attribute_definitions = Vec::new();
    for name in ["PK", "SK", "GSI1PK", "GSI1SK", "GSI2PK", "GSI2SK"] {
        attribute_definitions.push(string_attribute(name)?);
    }

    client
        .create_table()
        .table_name(table_name)
        .key_schema(key("PK", KeyType::Hash)?)
        .key_schema(key("SK", KeyType::Range)?)
        .set_attribute_definitions(Some(attribute_definitions))
        .global_secondary_indexes(index("GSI1", "GSI1PK", "GSI1SK")?)
        .global_secondary_indexes(index("GSI2", "GSI2PK", "GSI2SK")?)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .map_err(|e| map_sdk_error(e, "Table", "failed to create table"))?;

    Ok(())
}

/// Ensures the table exists and is active.
pub async fn ensure_table(client: &Client, table_name: &str) -> Result<()> {
    if table_status(client, table_name).await?.is_none() {
        tracing::info!(table = table_name, "Creating DynamoDB table");
        create_table(client, table_name).await?;
    }

    for _ in 0..MAX_POLLS {
        match table_status(client, table_name).await? {
            Some(TableStatus::Active) => return Ok(()),
            _ => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }

    Err(map_connection_error(format!(
        "table {table_name} did not become active"
    )))
}
