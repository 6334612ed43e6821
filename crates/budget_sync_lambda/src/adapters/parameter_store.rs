use async_trait::async_trait;

use crate::adapters::credentials::SessionCredentials;

/// Writes one string parameter into the store of the account the credentials
/// belong to. Implementations always overwrite an existing value.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn put_parameter(
        &self,
        credentials: &SessionCredentials,
        name: &str,
        value: &str,
    ) -> Result<(), String>;
}
