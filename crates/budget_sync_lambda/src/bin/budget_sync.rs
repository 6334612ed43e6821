use async_trait::async_trait;
use aws_sdk_ssm::config::Credentials;
use aws_sdk_ssm::types::ParameterType;
use budget_sync_lambda::adapters::credentials::{CredentialBroker, SessionCredentials};
use budget_sync_lambda::adapters::parameter_store::ParameterStore;
use budget_sync_lambda::config::SyncConfig;
use budget_sync_lambda::handlers::stream::{handle_stream_event, InvocationResponse};
use budget_sync_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::Instrument;

struct StsCredentialBroker {
    sts_client: aws_sdk_sts::Client,
}

#[async_trait]
impl CredentialBroker for StsCredentialBroker {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<SessionCredentials, String> {
        let output = self
            .sts_client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|error| aws_sdk_sts::error::DisplayErrorContext(error).to_string())?;

        let credentials = output
            .credentials()
            .ok_or_else(|| "assume role response carried no credentials".to_string())?;

        Ok(SessionCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
        })
    }
}

/// Builds a client per write because every spoke account has its own
/// credentials. Region and retry settings come from the function's own config.
struct SsmParameterStore {
    base_config: aws_config::SdkConfig,
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn put_parameter(
        &self,
        credentials: &SessionCredentials,
        name: &str,
        value: &str,
    ) -> Result<(), String> {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            "budget-sync-assume-role",
        );
        let ssm_config = aws_sdk_ssm::config::Builder::from(&self.base_config)
            .credentials_provider(provider)
            .build();

        aws_sdk_ssm::Client::from_conf(ssm_config)
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| aws_sdk_ssm::error::DisplayErrorContext(error).to_string())
    }
}

struct RuntimeDependencies {
    config: SyncConfig,
    broker: StsCredentialBroker,
    store: SsmParameterStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<InvocationResponse, Error> {
    let span = tracing::info_span!("budget_sync", request_id = %event.context.request_id);
    let response = handle_stream_event(&event.payload, &deps.config, &deps.broker, &deps.store)
        .instrument(span)
        .await;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = SyncConfig::from_env()?;
    init_logging(config.log_format);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        config,
        broker: StsCredentialBroker {
            sts_client: aws_sdk_sts::Client::new(&aws_config),
        },
        store: SsmParameterStore {
            base_config: aws_config,
        },
    };
    tracing::info!(
        parameter_name = %deps.config.parameter_name,
        role_name = %deps.config.role_name,
        "budget sync function initialised"
    );

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
