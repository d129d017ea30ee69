//! User provisioning

use super::{ProvisionError, UserData};
use crate::constants::OPERATOR_INFO;
use crate::provider::graylog::CreateUserRequest;
use crate::provider::GraylogProvider;
use tracing::info;

/// Find the user by name or create it, and record its ID
pub(super) async fn ensure_user(
    provider: &dyn GraylogProvider,
    name: &str,
    user: &mut UserData,
) -> Result<(), ProvisionError> {
    if let Some(existing) = provider.get_user(name).await? {
        info!("User {} already provisioned", name);
        user.id = existing.id;
        return Ok(());
    }

    info!("Creating user {}", name);
    let request = CreateUserRequest {
        username: name.to_string(),
        email: format!("{name}@{OPERATOR_INFO}"),
        full_name: name.to_string(),
        password: user.initial_password.as_str().to_owned(),
        roles: user.roles.clone(),
        permissions: Vec::new(),
    };
    provider.create_user(&request).await?;

    // the create call does not return the ID
    let created = provider
        .get_user(name)
        .await?
        .ok_or_else(|| ProvisionError::UserMissingAfterCreate {
            username: name.to_string(),
        })?;
    user.id = created.id;
    Ok(())
}
