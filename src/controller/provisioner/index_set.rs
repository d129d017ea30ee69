//! Index set provisioning
//!
//! Tenant index sets are copies of a template index set, so retention,
//! rotation and shard settings are managed in one place in Graylog.

use super::{IndexSetData, ProvisionError};
use crate::constants::OPERATOR_INFO;
use crate::provider::GraylogProvider;
use serde_json::{Map, Value};
use tracing::info;

/// Find the index set by title or clone it from the template, and record its ID
pub(super) async fn ensure_index_set(
    provider: &dyn GraylogProvider,
    name: &str,
    index_set: &mut IndexSetData,
) -> Result<(), ProvisionError> {
    let index_sets = provider.list_index_sets().await?;

    if let Some(existing) = index_sets.iter().find(|set| set.title == name) {
        info!("Index set {} already provisioned", name);
        index_set.id.clone_from(&existing.id);
        return Ok(());
    }

    let template = index_sets
        .iter()
        .find(|set| set.title == index_set.template_name)
        .ok_or_else(|| ProvisionError::TemplateNotFound {
            template: index_set.template_name.clone(),
        })?;

    info!(
        "Creating index set {} from template {} ({})",
        name, template.title, template.id
    );
    let template_body = provider.get_index_set(&template.id).await?;
    let created = provider
        .create_index_set(&clone_template(template_body, name))
        .await?;
    index_set.id = created.id;
    Ok(())
}

/// Turn a template index set into the body for a new tenant index set
///
/// Every template setting is kept; identity fields are replaced.
#[must_use]
pub fn clone_template(mut template: Map<String, Value>, name: &str) -> Map<String, Value> {
    template.insert("id".to_string(), Value::Null);
    template.insert("title".to_string(), Value::String(name.to_string()));
    template.insert(
        "description".to_string(),
        Value::String(format!("{name}@{OPERATOR_INFO}")),
    );
    template.insert(
        "index_prefix".to_string(),
        Value::String(format!("{name}-")),
    );
    template
}
