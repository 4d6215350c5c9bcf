pub const BUG: &str = "Bug";
pub const USER_STORY: &str = "User Story";
pub const TASK: &str = "Task";

const URI_PREFIX: &str = "vstfs:///WorkItemTracking/WorkItem/";

/// Read-only view of a work item as returned by the tracking server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: u32,
    pub title: String,
    pub type_name: String,
    pub uri: String,
    /// Ids of linked work items, in server order.
    pub links: Vec<u32>,
}

impl WorkItem {
    pub fn new(id: u32, type_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            type_name: type_name.into(),
            uri: artifact_uri(id),
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = u32>) -> Self {
        self.links = links.into_iter().collect();
        self
    }

    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// Path and query part of the artifact URI.
    pub fn uri_path(&self) -> String {
        match self.uri.split_once("://") {
            Some((_, rest)) => match rest.find('/') {
                Some(index) => rest[index..].to_string(),
                None => "/".to_string(),
            },
            None => self.uri.clone(),
        }
    }
}

pub fn artifact_uri(id: u32) -> String {
    format!("{URI_PREFIX}{id}")
}
