use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
}

/// Entry of a contents listing, or a single file when read directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteArtifact {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
    /// Base64 body, only present on single-file reads.
    #[serde(default)]
    pub content: Option<String>,
}

impl RemoteArtifact {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }

    /// Placeholder entries used to keep otherwise empty directories in git.
    pub fn is_sentinel(&self) -> bool {
        self.name.starts_with('.')
    }
}
