//! Calls through the authenticated executor.

use crate::SyncResult;
use auth_engine::{ApiRequest, ApiResult, AuthenticatedExecutor};
use serde::de::DeserializeOwned;

/// Execute `request` and decode the JSON body.
pub(crate) async fn fetch<T: DeserializeOwned>(
    executor: &AuthenticatedExecutor,
    request: ApiResult<ApiRequest>,
) -> SyncResult<T> {
    Ok(executor.execute_json(&request?).await?)
}

/// Execute `request`, ignoring the body.
pub(crate) async fn send(
    executor: &AuthenticatedExecutor,
    request: ApiResult<ApiRequest>,
) -> SyncResult<()> {
    executor.execute(&request?).await?;
    Ok(())
}
