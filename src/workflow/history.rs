use std::collections::VecDeque;

use crate::domain::branch::BranchSpec;
use crate::domain::change::Changeset;
use crate::error::AppResult;
use crate::services::VersionControlService;

pub const PAGE_SIZE: usize = 256;

/// Walks a branch's history page by page, fetching each changeset's file
/// changes only when it is handed out.
pub struct HistoryCursor<'a> {
    service: &'a dyn VersionControlService,
    branch: &'a BranchSpec,
    pending: VecDeque<Changeset>,
    skip: usize,
    page_size: usize,
    exhausted: bool,
}

impl<'a> HistoryCursor<'a> {
    pub fn new(service: &'a dyn VersionControlService, branch: &'a BranchSpec) -> Self {
        Self {
            service,
            branch,
            pending: VecDeque::new(),
            skip: 0,
            page_size: PAGE_SIZE,
            exhausted: false,
        }
    }

    #[cfg(test)]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn next(&mut self) -> AppResult<Option<Changeset>> {
        if self.pending.is_empty() && !self.exhausted {
            let page = self
                .service
                .changesets(self.branch, self.skip, self.page_size)
                .await?;
            self.skip += page.len();
            self.exhausted = page.len() < self.page_size;
            self.pending.extend(page);
        }

        let Some(mut changeset) = self.pending.pop_front() else {
            return Ok(None);
        };
        changeset.changes = self.service.changes(changeset.id).await?;
        Ok(Some(changeset))
    }
}
