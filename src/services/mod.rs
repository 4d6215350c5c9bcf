pub mod connection;
pub mod report_exporter;
pub mod version_control;
pub mod work_item_tracker;

pub use connection::{Connection, ServerConnector};
pub use report_exporter::ReportExporter;
pub use version_control::VersionControlService;
pub use work_item_tracker::WorkItemService;
