pub mod config;
pub mod mine;
