//! In-memory server used by unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::domain::branch::BranchSpec;
use crate::domain::change::{Change, ChangeType, Changeset};
use crate::domain::work_item::WorkItem;
use crate::error::{AppError, AppResult};
use crate::services::{Connection, ServerConnector, VersionControlService, WorkItemService};

pub fn changeset(id: u32, comment: &str, changes: &[(&str, &str)]) -> Changeset {
    let epoch = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    Changeset {
        id,
        comment: comment.to_string(),
        created: epoch + Duration::hours(i64::from(id)),
        changes: changes
            .iter()
            .map(|(path, kind)| Change::new(*path, ChangeType::parse(kind)))
            .collect(),
    }
}

#[derive(Default)]
pub struct FakeServer {
    history: Vec<(String, Changeset)>,
    associations: HashMap<u32, Vec<u32>>,
    work_items: HashMap<u32, WorkItem>,
    files: HashMap<String, usize>,
    unreachable_changesets: Vec<u32>,
    work_item_fetches: AtomicUsize,
}

impl FakeServer {
    pub fn with_changeset(mut self, branch_path: &str, changeset: Changeset) -> Self {
        self.history.push((branch_path.to_string(), changeset));
        self
    }

    pub fn with_work_item(mut self, item: WorkItem) -> Self {
        self.work_items.insert(item.id, item);
        self
    }

    pub fn with_association(mut self, changeset_id: u32, work_item_ids: &[u32]) -> Self {
        self.associations
            .insert(changeset_id, work_item_ids.to_vec());
        self
    }

    pub fn with_files(mut self, scope_path: &str, count: usize) -> Self {
        self.files.insert(scope_path.to_string(), count);
        self
    }

    pub fn with_unreachable_changeset(mut self, changeset_id: u32) -> Self {
        self.unreachable_changesets.push(changeset_id);
        self
    }

    pub fn work_item_fetches(&self) -> usize {
        self.work_item_fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, id: u32) -> AppResult<WorkItem> {
        self.work_items
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::WorkItemTracking(format!("work item {id} does not exist")))
    }
}

#[async_trait]
impl VersionControlService for FakeServer {
    async fn changesets(
        &self,
        branch: &BranchSpec,
        skip: usize,
        top: usize,
    ) -> AppResult<Vec<Changeset>> {
        Ok(self
            .history
            .iter()
            .filter(|(path, changeset)| {
                *path == branch.path && (branch.from..=branch.to).contains(&changeset.id)
            })
            .skip(skip)
            .take(top)
            .map(|(_, changeset)| Changeset {
                changes: Vec::new(),
                ..changeset.clone()
            })
            .collect())
    }

    async fn changes(&self, changeset_id: u32) -> AppResult<Vec<Change>> {
        if self.unreachable_changesets.contains(&changeset_id) {
            return Err(AppError::Connection(format!(
                "connection reset while reading changeset {changeset_id}"
            )));
        }
        Ok(self
            .history
            .iter()
            .find(|(_, changeset)| changeset.id == changeset_id)
            .map(|(_, changeset)| changeset.changes.clone())
            .unwrap_or_default())
    }

    async fn count_files(&self, scope_path: &str) -> AppResult<usize> {
        Ok(self.files.get(scope_path).copied().unwrap_or(0))
    }
}

#[async_trait]
impl WorkItemService for FakeServer {
    async fn linked_work_items(&self, changeset_id: u32) -> AppResult<Vec<WorkItem>> {
        self.associations
            .get(&changeset_id)
            .map(|ids| ids.iter().map(|id| self.lookup(*id)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn work_item(&self, id: u32) -> AppResult<WorkItem> {
        self.work_item_fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(id)
    }
}

pub struct FakeConnector {
    server: Arc<FakeServer>,
    connections: AtomicUsize,
}

impl FakeConnector {
    pub fn new(server: FakeServer) -> Self {
        Self {
            server: Arc::new(server),
            connections: AtomicUsize::new(0),
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl ServerConnector for FakeConnector {
    fn connect(&self) -> AppResult<Connection> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Connection {
            version_control: self.server.clone(),
            work_items: self.server.clone(),
        })
    }
}
