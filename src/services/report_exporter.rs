use std::path::Path;

use crate::domain::report::Report;
use crate::error::AppResult;

pub trait ReportExporter: Send + Sync {
    fn export(&self, report: &Report, destination: &Path) -> AppResult<()>;
}
