use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::Client;

/// Load the shared AWS configuration from the default provider chain.
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

pub fn build_client(config: &SdkConfig) -> Client {
    Client::new(config)
}
