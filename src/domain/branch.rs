use serde::Deserialize;

/// A branch of the repository and the changeset range to mine from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchSpec {
    pub path: String,
    pub from: u32,
    pub to: u32,
}

impl BranchSpec {
    #[cfg(test)]
    pub fn new(path: impl Into<String>, from: u32, to: u32) -> Self {
        Self {
            path: path.into(),
            from,
            to,
        }
    }

    /// Path of a server item relative to this branch.
    pub fn relative_path<'a>(&self, server_item: &'a str) -> &'a str {
        server_item
            .strip_prefix(self.path.as_str())
            .unwrap_or(server_item)
    }
}
