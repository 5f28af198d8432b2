pub mod image_client;
pub mod text_client;

use crate::{config::BedrockConfig, error::Result};
use aws_sdk_bedrockruntime::Client;

pub use image_client::ImageClient;
pub use text_client::TextClient;

#[derive(Clone)]
pub struct BedrockClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl BedrockClient {
    pub async fn new(bedrock_config: BedrockConfig) -> Result<Self> {
        let region = aws_sdk_bedrockruntime::config::Region::new(
            bedrock_config
                .region
                .clone()
                .unwrap_or_else(|| "us-east-1".to_string()),
        );

        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&bedrock_config.access_key, &bedrock_config.secret_key)
        {
            aws_config::from_env()
                .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "thumbgen",
                ))
                .region(region)
                .load()
                .await
        } else {
            aws_config::from_env().region(region).load().await
        };

        let client = Client::new(&aws_config);
        log::debug!("Bedrock runtime client ready");

        Ok(Self {
            text_client: TextClient::new(client.clone()),
            image_client: ImageClient::new(client),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
