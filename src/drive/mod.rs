pub mod api;
pub mod client;
pub mod retry;
pub mod types;

pub use api::{DriveApi, HttpDriveApi};
pub use client::DriveClient;
pub use retry::RetryPolicy;
pub use types::{Entry, EntryKind, FileList, FolderMetadata, Query};
