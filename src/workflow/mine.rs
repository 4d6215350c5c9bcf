use std::path::Path;

use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::change::ChangeRecord;
use crate::domain::module::ModuleFileCount;
use crate::error::AppResult;
use crate::workflow::classifier::ChangeClassifier;
use crate::workflow::history::HistoryCursor;
use crate::workflow::module_counter::count_module_files;
use crate::workflow::report::assemble;
use crate::workflow::resolver::resolve_work_item;

/// Everything collected by one mining run.
#[derive(Debug, Default)]
pub struct MiningRun {
    pub records: Vec<ChangeRecord>,
    pub module_files: Vec<ModuleFileCount>,
}

/// Mines every configured branch in order, then counts module files.
///
/// `progress` is called once per processed changeset with the running total
/// across all branches. Any server failure aborts the whole run.
pub async fn mine_history<P>(ctx: &AppContext, mut progress: P) -> AppResult<MiningRun>
where
    P: FnMut(usize) + Send,
{
    let config = &ctx.config;
    let classifier = ChangeClassifier::new(&config.ignore, &config.mappings);
    let mut run = MiningRun::default();
    let mut processed = 0;

    for branch in &config.branches {
        info!(
            branch = branch.path.as_str(),
            from = branch.from,
            to = branch.to,
            "mining branch"
        );
        let connection = ctx.connector.connect()?;
        let mut history = HistoryCursor::new(connection.version_control.as_ref(), branch);

        while let Some(changeset) = history.next().await? {
            if changeset.changes.is_empty() {
                debug!(changeset = changeset.id, "no changes, skipped");
                continue;
            }

            let linked = connection
                .work_items
                .linked_work_items(changeset.id)
                .await?;
            let work_item = resolve_work_item(connection.work_items.as_ref(), linked).await?;
            let records = classifier.classify(&changeset, branch, work_item.as_ref());
            debug!(
                changeset = changeset.id,
                work_item = work_item.as_ref().map_or(0, |item| item.id),
                records = records.len(),
                "processed changeset"
            );
            run.records.extend(records);

            processed += 1;
            progress(processed);
        }
        info!(branch = branch.path.as_str(), processed, "branch done");
    }

    let connection = ctx.connector.connect()?;
    run.module_files = count_module_files(
        connection.version_control.as_ref(),
        &config.target,
        &config.mappings,
    )
    .await?;

    info!(
        changesets = processed,
        records = run.records.len(),
        modules = run.module_files.len(),
        "mining finished"
    );
    Ok(run)
}

/// Mines, assembles and exports the report to `destination`. Nothing is
/// written unless collection succeeded.
pub async fn produce_report<P>(ctx: &AppContext, destination: &Path, progress: P) -> AppResult<()>
where
    P: FnMut(usize) + Send,
{
    let run = mine_history(ctx, progress).await?;
    let report = assemble(run);
    ctx.exporter.export(&report, destination)?;
    info!(path = %destination.display(), "report exported");
    Ok(())
}
