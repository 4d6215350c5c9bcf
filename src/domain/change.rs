use std::ops::BitOr;

use chrono::{DateTime, Utc};

use crate::domain::work_item::WorkItem;

/// Set of change flags reported for a single item in a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeType(u32);

impl ChangeType {
    pub const NONE: Self = Self(1);
    pub const ADD: Self = Self(1 << 1);
    pub const EDIT: Self = Self(1 << 2);
    pub const ENCODING: Self = Self(1 << 3);
    pub const RENAME: Self = Self(1 << 4);
    pub const DELETE: Self = Self(1 << 5);
    pub const UNDELETE: Self = Self(1 << 6);
    pub const BRANCH: Self = Self(1 << 7);
    pub const MERGE: Self = Self(1 << 8);
    pub const LOCK: Self = Self(1 << 9);
    pub const ROLLBACK: Self = Self(1 << 10);
    pub const SOURCE_RENAME: Self = Self(1 << 11);
    pub const TARGET_RENAME: Self = Self(1 << 12);
    pub const PROPERTY: Self = Self(1 << 13);

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    fn from_name(name: &str) -> Option<Self> {
        let flag = match name.trim().to_ascii_lowercase().as_str() {
            "none" => Self::NONE,
            "add" => Self::ADD,
            "edit" => Self::EDIT,
            "encoding" => Self::ENCODING,
            "rename" => Self::RENAME,
            "delete" => Self::DELETE,
            "undelete" => Self::UNDELETE,
            "branch" => Self::BRANCH,
            "merge" => Self::MERGE,
            "lock" => Self::LOCK,
            "rollback" => Self::ROLLBACK,
            "sourcerename" => Self::SOURCE_RENAME,
            "targetrename" => Self::TARGET_RENAME,
            "property" => Self::PROPERTY,
            _ => return None,
        };
        Some(flag)
    }

    /// Parses the comma separated form used by the server, e.g. `"edit, merge"`.
    /// Unknown names are skipped.
    pub fn parse(value: &str) -> Self {
        value
            .split(',')
            .filter_map(Self::from_name)
            .fold(Self::default(), BitOr::bitor)
    }
}

impl BitOr for ChangeType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone)]
pub struct Change {
    pub server_item: String,
    pub change_type: ChangeType,
}

impl Change {
    pub fn new(server_item: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            server_item: server_item.into(),
            change_type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Changeset {
    pub id: u32,
    pub comment: String,
    pub created: DateTime<Utc>,
    pub changes: Vec<Change>,
}

/// One reported row: a file touched by a changeset, with the work item
/// chosen for that changeset. `work_item_id` is 0 when none was resolved,
/// and the other work item fields are then `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub relative_path: String,
    pub changeset_id: u32,
    pub work_item_id: u32,
    pub work_item_title: Option<String>,
    pub comment: String,
    pub work_item_uri: Option<String>,
    pub work_item_type: Option<String>,
    pub module: String,
    pub date: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(
        changeset: &Changeset,
        relative_path: &str,
        module: &str,
        work_item: Option<&WorkItem>,
    ) -> Self {
        Self {
            relative_path: relative_path.to_string(),
            changeset_id: changeset.id,
            work_item_id: work_item.map_or(0, |item| item.id),
            work_item_title: work_item.map(|item| item.title.clone()),
            comment: changeset.comment.clone(),
            work_item_uri: work_item.map(WorkItem::uri_path),
            work_item_type: work_item.map(|item| item.type_name.clone()),
            module: module.to_string(),
            date: changeset.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_combined_flags() {
        let change_type = ChangeType::parse("edit, merge");
        assert!(change_type.contains(ChangeType::EDIT));
        assert!(change_type.contains(ChangeType::MERGE));
        assert!(!change_type.contains(ChangeType::DELETE));
    }

    #[test]
    fn ignores_unknown_flag_names() {
        let change_type = ChangeType::parse("Add, SomethingNew");
        assert_eq!(change_type, ChangeType::ADD);
    }

    #[test]
    fn empty_flag_is_never_contained() {
        assert!(!ChangeType::parse("edit").contains(ChangeType::default()));
    }

    #[test]
    fn record_without_work_item_uses_sentinel() {
        let changeset = Changeset {
            id: 12,
            comment: "fix".to_string(),
            created: Utc::now(),
            changes: Vec::new(),
        };
        let record = ChangeRecord::new(&changeset, "/a.cs", "Core", None);
        assert_eq!(record.work_item_id, 0);
        assert_eq!(record.work_item_title, None);
        assert_eq!(record.work_item_uri, None);
        assert_eq!(record.work_item_type, None);
    }
}
