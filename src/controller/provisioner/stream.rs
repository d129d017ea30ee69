//! Stream provisioning

use super::{ProvisionError, StreamData};
use crate::constants::OPERATOR_INFO;
use crate::provider::graylog::{
    stream_grn, user_grn, CreateStreamRequest, ShareRequest, StreamRule, CAPABILITY_VIEW,
    STREAM_RULE_MATCH_EXACTLY,
};
use crate::provider::GraylogProvider;
use tracing::{info, warn};

/// Find the stream by title or create, start and share it, and record its ID
///
/// `index_set_id` and `user_id` may be empty when earlier steps failed;
/// they are passed to Graylog as they are.
pub(super) async fn ensure_stream(
    provider: &dyn GraylogProvider,
    name: &str,
    stream: &mut StreamData,
    index_set_id: &str,
    user_id: &str,
) -> Result<(), ProvisionError> {
    let streams = provider.list_streams().await?;

    if let Some(existing) = streams.iter().find(|s| s.title == name) {
        info!("Stream {} already provisioned", name);
        stream.id.clone_from(&existing.id);
        return Ok(());
    }

    if index_set_id.is_empty() || user_id.is_empty() {
        warn!(
            "Creating stream {} with missing dependencies (index set '{}', user '{}')",
            name, index_set_id, user_id
        );
    }

    info!("Creating stream {}", name);
    let request = CreateStreamRequest {
        title: name.to_string(),
        description: format!("{name}@{OPERATOR_INFO}"),
        rules: vec![StreamRule {
            field: stream.rule_field_name.clone(),
            value: name.to_string(),
            rule_type: STREAM_RULE_MATCH_EXACTLY,
        }],
        remove_matches_from_default_stream: true,
        index_set_id: index_set_id.to_string(),
    };
    let stream_id = provider.create_stream(&request).await?;
    stream.id.clone_from(&stream_id);

    provider.resume_stream(&stream_id).await?;

    let share = ShareRequest::grant(user_grn(user_id), CAPABILITY_VIEW);
    provider
        .share_entity(&stream_grn(&stream_id), &share)
        .await?;

    Ok(())
}
