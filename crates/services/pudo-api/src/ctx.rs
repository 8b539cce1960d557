//! Service context
use std::{sync::Arc, time::Duration};

use pudo_config::Environment;
use queries::QueryCatalog;

use crate::gateway::Gateway;

/// The PUDO API context
#[derive(Clone)]
pub struct Ctx {
    pub catalog: Arc<QueryCatalog>,
    pub gateway: Arc<dyn Gateway>,
    /// Controls whether error responses carry the full error chain.
    pub environment: Environment,
    /// Upper bound on each engine call; `None` waits for the engine.
    pub query_timeout: Option<Duration>,
}
