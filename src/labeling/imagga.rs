use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use super::{FoodTag, ImageTagger, TagError};
use crate::config::ImaggaConfig;

const TAG_TIMEOUT: Duration = Duration::from_secs(30);

/// Imagga tagging client: one upload plus one tags request per image,
/// credentialed with a key/secret basic-auth pair.
pub struct ImaggaClient {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    result: UploadResult,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    upload_id: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    result: TagsResult,
}

#[derive(Debug, Deserialize)]
struct TagsResult {
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    #[serde(default)]
    confidence: f64,
    tag: TagName,
}

#[derive(Debug, Deserialize)]
struct TagName {
    en: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ImaggaClient {
    pub fn new(config: &ImaggaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(TAG_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            base_url: config.base_url.clone(),
        })
    }

    async fn service_error(response: reqwest::Response, operation: &str) -> TagError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("{operation} failed with status {status}"),
        };
        TagError::Service(message)
    }
}

#[async_trait]
impl ImageTagger for ImaggaClient {
    async fn tag(&self, image: Bytes, filename: &str) -> Result<Vec<FoodTag>, TagError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let upload = self
            .client
            .post(format!("{}/uploads", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await?;
        if !upload.status().is_success() {
            return Err(Self::service_error(upload, "upload").await);
        }
        let upload: UploadResponse = upload.json().await?;

        let tags = self
            .client
            .get(format!("{}/tags", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("image_upload_id", upload.result.upload_id.as_str())])
            .send()
            .await?;
        if !tags.status().is_success() {
            return Err(Self::service_error(tags, "tagging").await);
        }
        let tags: TagsResponse = tags.json().await?;

        Ok(tags
            .result
            .tags
            .into_iter()
            .map(|t| FoodTag {
                name: t.tag.en,
                confidence: t.confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_and_tags_payloads() {
        let upload: UploadResponse =
            serde_json::from_str(r#"{"result": {"upload_id": "i05e132196706b94b1d85efb5f3SaM1j"}}"#)
                .unwrap();
        assert_eq!(upload.result.upload_id, "i05e132196706b94b1d85efb5f3SaM1j");

        let tags: TagsResponse = serde_json::from_str(
            r#"{"result": {"tags": [
                {"confidence": 61.41, "tag": {"en": "banana"}},
                {"tag": {"en": "fruit"}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(tags.result.tags.len(), 2);
        assert_eq!(tags.result.tags[0].tag.en, "banana");
        assert_eq!(tags.result.tags[1].confidence, 0.0);
    }

    #[test]
    fn parses_error_body() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": {"message": "invalid api credentials"}}"#).unwrap();
        assert_eq!(body.error.message, "invalid api credentials");
    }
}
