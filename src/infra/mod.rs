pub mod tfs;
pub mod xlsx;
