use async_trait::async_trait;

use crate::domain::work_item::WorkItem;
use crate::error::AppResult;

#[async_trait]
pub trait WorkItemService: Send + Sync {
    /// Work items associated with a changeset, in server order, with their links.
    async fn linked_work_items(&self, changeset_id: u32) -> AppResult<Vec<WorkItem>>;

    async fn work_item(&self, id: u32) -> AppResult<WorkItem>;
}
