use serde::{Deserialize, Serialize};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const PHOTO_MIME: &str = "image/jpeg";

/// A remote file or folder as returned by a search. This is a point-in-time
/// snapshot; it is not re-validated before being used in a later move.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Photo,
}

impl EntryKind {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Folder => FOLDER_MIME,
            Self::Photo => PHOTO_MIME,
        }
    }

    /// Folders are matched by exact name; photo names are numeric fragments
    /// matched by containment.
    fn name_operator(self) -> &'static str {
        match self {
            Self::Folder => "=",
            Self::Photo => "contains",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::Photo => write!(f, "photo"),
        }
    }
}

/// Builder for the Drive search string combining a mime-type match, an
/// optional name match and an optional parent containment clause.
#[derive(Debug, Clone)]
pub struct Query {
    kind: EntryKind,
    name: Option<String>,
    parent: Option<String>,
}

impl Query {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            name: None,
            parent: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.parent = Some(parent_id.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut clauses = vec![format!("mimeType='{}'", self.kind.mime())];
        if let Some(name) = &self.name {
            clauses.push(format!(
                "name {} '{}'",
                self.kind.name_operator(),
                escape(name)
            ));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("'{}' in parents", escape(parent)));
        }
        clauses.join(" and ")
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One page of a `files.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<Entry>,
    pub next_page_token: Option<String>,
}

/// Request body for `files.create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMetadata {
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
}

impl FolderMetadata {
    pub fn new(name: &str, parent_id: &str) -> Self {
        Self {
            name: name.to_string(),
            mime_type: FOLDER_MIME.to_string(),
            parents: vec![parent_id.to_string()],
        }
    }
}
