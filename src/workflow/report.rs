use crate::domain::change::ChangeRecord;
use crate::domain::module::ModuleFileCount;
use crate::domain::report::{Cell, Report, Table};
use crate::workflow::mine::MiningRun;

pub const WORK_ITEMS_SHEET: &str = "Work Items";
pub const FILES_IN_MODULES_SHEET: &str = "Files in Modules";

const WORK_ITEM_COLUMNS: &[&str] = &[
    "WorkItemId",
    "WorkItemTitle",
    "Module",
    "Path",
    "Comment",
    "Type",
    "Date",
];
const MODULE_COLUMNS: &[&str] = &["Module", "Files"];

pub fn assemble(run: MiningRun) -> Report {
    let MiningRun {
        mut records,
        module_files,
    } = run;

    // Stable: records of the same work item keep their encounter order.
    records.sort_by_key(|record| record.work_item_id);

    Report {
        work_items: Table {
            name: WORK_ITEMS_SHEET,
            columns: WORK_ITEM_COLUMNS,
            rows: records.into_iter().map(work_item_row).collect(),
        },
        files_in_modules: Table {
            name: FILES_IN_MODULES_SHEET,
            columns: MODULE_COLUMNS,
            rows: module_files.into_iter().map(module_row).collect(),
        },
    }
}

fn work_item_row(record: ChangeRecord) -> Vec<Cell> {
    vec![
        Cell::Integer(i64::from(record.work_item_id)),
        record.work_item_title.into(),
        Cell::Text(record.module),
        Cell::Text(record.relative_path),
        Cell::Text(record.comment),
        record.work_item_type.into(),
        Cell::Date(record.date),
    ]
}

fn module_row(count: ModuleFileCount) -> Vec<Cell> {
    vec![
        Cell::Text(count.module),
        Cell::Integer(i64::try_from(count.files).unwrap_or(i64::MAX)),
    ]
}
