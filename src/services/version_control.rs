use async_trait::async_trait;

use crate::domain::branch::BranchSpec;
use crate::domain::change::{Change, Changeset};
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// One page of changesets recorded under the branch path within its
    /// changeset range, in server order. `changes` is left empty.
    async fn changesets(
        &self,
        branch: &BranchSpec,
        skip: usize,
        top: usize,
    ) -> AppResult<Vec<Changeset>>;

    /// File level changes of a changeset.
    async fn changes(&self, changeset_id: u32) -> AppResult<Vec<Change>>;

    /// Number of non-deleted files, recursively under `scope_path`, at the
    /// latest version.
    async fn count_files(&self, scope_path: &str) -> AppResult<usize>;
}
