pub mod classifier;
pub mod history;
pub mod mine;
pub mod module_counter;
pub mod report;
pub mod resolver;
