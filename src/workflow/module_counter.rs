use tracing::debug;

use crate::domain::module::{ModuleFileCount, ModuleMap};
use crate::error::AppResult;
use crate::services::VersionControlService;

/// Counts current files under each configured module, in declared order.
pub async fn count_module_files(
    service: &dyn VersionControlService,
    target: &str,
    modules: &ModuleMap,
) -> AppResult<Vec<ModuleFileCount>> {
    let mut counts = Vec::with_capacity(modules.len());
    for (prefix, module) in modules.iter() {
        let scope = module_scope(target, prefix);
        let files = service.count_files(&scope).await?;
        debug!(module, scope = scope.as_str(), files, "counted module files");
        counts.push(ModuleFileCount {
            module: module.to_string(),
            files,
        });
    }
    Ok(counts)
}

pub fn module_scope(target: &str, prefix: &str) -> String {
    format!(
        "{}/{}",
        target.trim_end_matches('/'),
        prefix.trim_matches('/')
    )
}
