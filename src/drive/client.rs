use crate::drive::api::DriveApi;
use crate::drive::retry::{with_retry, RetryPolicy};
use crate::drive::types::{Entry, EntryKind, FolderMetadata, Query};
use crate::error::Result;
use tracing::{debug, warn};

/// High-level Drive operations: paginated search, idempotent folder
/// creation and moves, all under one retry policy.
pub struct DriveClient<A> {
    api: A,
    retry: RetryPolicy,
}

impl<A: DriveApi> DriveClient<A> {
    pub fn new(api: A, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// Execute a filtered listing, following pagination tokens. Each page
    /// request is retried independently.
    pub async fn search(&self, query: &Query) -> Result<Vec<Entry>> {
        let q = query.build();
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let api = &self.api;
            let query_str = q.as_str();
            let token = page_token.as_deref();
            let page = with_retry("files.list", &self.retry, move || async move {
                api.list(query_str, token).await
            })
            .await?;

            entries.extend(page.files);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("query [{}] matched {} entries", q, entries.len());
        Ok(entries)
    }

    /// First matching entry's id, or `None` when nothing matches. Absence
    /// is logged, never fatal.
    pub async fn resolve_id(
        &self,
        name: &str,
        kind: EntryKind,
        parent_id: Option<&str>,
    ) -> Result<Option<String>> {
        let mut query = Query::new(kind).name(name);
        if let Some(parent) = parent_id {
            query = query.parent(parent);
        }

        let entries = self.search(&query).await?;
        match entries.first() {
            Some(entry) => Ok(Some(entry.id.clone())),
            None => {
                warn!("id of {} '{}' not found", kind, name);
                Ok(None)
            }
        }
    }

    /// Create a folder under `parent_id`. With `check_existing`, an
    /// existing folder of the same name is reused instead of duplicated.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
        check_existing: bool,
    ) -> Result<String> {
        if check_existing {
            if let Some(id) = self
                .resolve_existing_folder(name, parent_id)
                .await?
            {
                debug!("folder '{}' already exists", name);
                return Ok(id);
            }
        }

        let metadata = FolderMetadata::new(name, parent_id);
        let api = &self.api;
        let metadata_ref = &metadata;
        let entry = with_retry("files.create", &self.retry, move || async move {
            api.create(metadata_ref).await
        })
        .await?;

        debug!("folder '{}' created", name);
        Ok(entry.id)
    }

    // Existence probe for create_folder; a miss here is expected, so it
    // skips resolve_id's warning.
    async fn resolve_existing_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<String>> {
        let query = Query::new(EntryKind::Folder).name(name).parent(parent_id);
        let entries = self.search(&query).await?;
        Ok(entries.first().map(|entry| entry.id.clone()))
    }

    /// Reparent an entry from `from_parent` to `to_parent`. Uses the same
    /// retry policy as every other remote call.
    pub async fn move_entry(
        &self,
        entry_id: &str,
        from_parent: &str,
        to_parent: &str,
    ) -> Result<Entry> {
        let api = &self.api;
        let entry = with_retry("files.update", &self.retry, move || async move {
            api.update_parents(entry_id, to_parent, from_parent).await
        })
        .await?;

        debug!("entry '{}' moved to '{}'", entry_id, to_parent);
        Ok(entry)
    }

    /// All leaf photos directly under a parent folder.
    pub async fn list_photos_under(&self, parent_id: &str) -> Result<Vec<Entry>> {
        self.search(&Query::new(EntryKind::Photo).parent(parent_id)).await
    }
}
