use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    types::ObjectCannedAcl,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;

/// Parent prefix every attachment lands under.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Links returned for a stored object: one for viewing in the browser,
/// one forcing a download.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub web_view_link: String,
    pub downloadable_link: String,
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn upload(&self, key: &str, body: Bytes, content_type: &str)
        -> anyhow::Result<StoredObject>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl S3Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                cfg.access_key.clone(),
                cfg.secret_key.clone(),
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            bucket: cfg.bucket.clone(),
        })
    }

    fn links_for(&self, key: &str) -> StoredObject {
        let web_view_link = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let downloadable_link =
            format!("{}?response-content-disposition=attachment", web_view_link);
        StoredObject {
            web_view_link,
            downloadable_link,
        }
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(self.links_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> S3Storage {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("k", "s", None, None, "static"))
            .endpoint_url("http://localhost:9000")
            .force_path_style(true)
            .build();
        S3Storage {
            client: Client::from_conf(conf),
            endpoint: "http://localhost:9000".into(),
            bucket: "attachments".into(),
        }
    }

    #[test]
    fn links_are_path_style_under_bucket() {
        let links = storage().links_for("uploads/abc-report.pdf");
        assert_eq!(
            links.web_view_link,
            "http://localhost:9000/attachments/uploads/abc-report.pdf"
        );
        assert!(links
            .downloadable_link
            .ends_with("?response-content-disposition=attachment"));
        assert!(links.downloadable_link.starts_with(&links.web_view_link));
    }
}
