//! Destructive create-or-replace of the search index

use tracing::{info, warn};

use super::schema::IndexSchema;
use crate::error::Result;
use crate::services::IndexAdmin;

/// What `provision` did to reach the declared schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
  Created,
  Replaced,
}

/// Delete any index with the schema's name, then create it fresh.
///
/// Documents in a replaced index are lost. A missing index is the only
/// delete failure that is tolerated; anything else aborts before creation.
pub async fn provision(
  admin: &dyn IndexAdmin,
  schema: &IndexSchema,
  embedding_dimensions: usize,
) -> Result<ProvisionOutcome> {
  schema.validate(embedding_dimensions)?;

  let outcome = match admin.delete_index(&schema.name).await {
    Ok(()) => {
      warn!(index = %schema.name, "deleted existing index and its documents");
      ProvisionOutcome::Replaced
    }
    Err(e) if e.is_not_found() => ProvisionOutcome::Created,
    Err(e) => return Err(e),
  };

  admin.create_index(schema).await?;
  info!(index = %schema.name, dimensions = embedding_dimensions, ?outcome, "index provisioned");

  Ok(outcome)
}
