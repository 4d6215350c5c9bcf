use tracing::debug;

use crate::domain::branch::BranchSpec;
use crate::domain::change::{ChangeRecord, ChangeType, Changeset};
use crate::domain::module::ModuleMap;
use crate::domain::work_item::WorkItem;

pub struct ChangeClassifier<'a> {
    ignore: &'a [String],
    modules: &'a ModuleMap,
}

impl<'a> ChangeClassifier<'a> {
    pub fn new(ignore: &'a [String], modules: &'a ModuleMap) -> Self {
        Self { ignore, modules }
    }

    /// Turns the file changes of one changeset into report records. Ignored
    /// paths and anything carrying the merge flag produce no record.
    pub fn classify(
        &self,
        changeset: &Changeset,
        branch: &BranchSpec,
        work_item: Option<&WorkItem>,
    ) -> Vec<ChangeRecord> {
        changeset
            .changes
            .iter()
            .filter_map(|change| {
                let relative_path = branch.relative_path(&change.server_item);
                if self.is_ignored(relative_path) {
                    debug!(changeset = changeset.id, path = relative_path, "ignored path");
                    return None;
                }
                if change.change_type.contains(ChangeType::MERGE) {
                    debug!(changeset = changeset.id, path = relative_path, "merge change");
                    return None;
                }
                let module = self.modules.resolve(relative_path);
                Some(ChangeRecord::new(
                    changeset,
                    relative_path,
                    module,
                    work_item,
                ))
            })
            .collect()
    }

    fn is_ignored(&self, relative_path: &str) -> bool {
        self.ignore
            .iter()
            .any(|prefix| relative_path.starts_with(prefix.as_str()))
    }
}
