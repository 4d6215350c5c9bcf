pub mod branch;
pub mod change;
pub mod module;
pub mod report;
pub mod work_item;
