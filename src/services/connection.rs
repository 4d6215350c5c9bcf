use std::sync::Arc;

use crate::error::AppResult;
use crate::services::{VersionControlService, WorkItemService};

/// Services bound to one server session. Dropped when its scope ends.
pub struct Connection {
    pub version_control: Arc<dyn VersionControlService>,
    pub work_items: Arc<dyn WorkItemService>,
}

pub trait ServerConnector: Send + Sync {
    fn connect(&self) -> AppResult<Connection>;
}
