/// Transport seam for the Drive API: the raw wire operations without retry
/// or naming conventions, so tests can substitute an in-memory double.
use crate::drive::types::{Entry, FileList, FolderMetadata};
use crate::error::{AppError, Result, status_label};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const LIST_FIELDS: &str = "nextPageToken, files(id, name, parents)";
const ENTRY_FIELDS: &str = "id, name, parents";

#[async_trait]
pub trait DriveApi: Send + Sync {
    /// One page of a filtered listing.
    async fn list(&self, query: &str, page_token: Option<&str>) -> Result<FileList>;

    /// Create a folder from metadata, returning the new entry.
    async fn create(&self, metadata: &FolderMetadata) -> Result<Entry>;

    /// Reparent an entry by adding one parent and removing another.
    async fn update_parents(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parent: &str,
    ) -> Result<Entry>;
}

#[async_trait]
impl<T: DriveApi + ?Sized> DriveApi for Arc<T> {
    async fn list(&self, query: &str, page_token: Option<&str>) -> Result<FileList> {
        (**self).list(query, page_token).await
    }

    async fn create(&self, metadata: &FolderMetadata) -> Result<Entry> {
        (**self).create(metadata).await
    }

    async fn update_parents(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parent: &str,
    ) -> Result<Entry> {
        (**self).update_parents(file_id, add_parent, remove_parent).await
    }
}

pub struct HttpDriveApi {
    http: reqwest::Client,
    base: String,
    access_token: String,
}

impl HttpDriveApi {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: String) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| AppError::Config {
            message: format!("invalid API base URL '{}': {}", base_url, e),
        })?;

        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Map a non-success response to the remote error taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        body.truncate(300);
        Err(AppError::remote(
            status.as_u16(),
            format!("{}: {}", status_label(status.as_u16()), body),
        ))
    }
}

#[async_trait]
impl DriveApi for HttpDriveApi {
    async fn list(&self, query: &str, page_token: Option<&str>) -> Result<FileList> {
        debug!("files.list q={}", query);

        let mut request = self
            .http
            .get(format!("{}/files", self.base))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query),
                ("spaces", "drive"),
                ("fields", LIST_FIELDS),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, metadata: &FolderMetadata) -> Result<Entry> {
        debug!("files.create name={}", metadata.name);

        let response = self
            .http
            .post(format!("{}/files", self.base))
            .bearer_auth(&self.access_token)
            .query(&[("fields", ENTRY_FIELDS)])
            .json(metadata)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn update_parents(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parent: &str,
    ) -> Result<Entry> {
        debug!("files.update id={} -> parent {}", file_id, add_parent);

        let response = self
            .http
            .patch(format!("{}/files/{}", self.base, file_id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("addParents", add_parent),
                ("removeParents", remove_parent),
                ("fields", ENTRY_FIELDS),
            ])
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = HttpDriveApi::new(reqwest::Client::new(), "not a url", "t".into());
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let api = HttpDriveApi::new(
            reqwest::Client::new(),
            "https://www.googleapis.com/drive/v3/",
            "t".into(),
        )
        .unwrap();
        assert_eq!(api.base, "https://www.googleapis.com/drive/v3");
    }
}
