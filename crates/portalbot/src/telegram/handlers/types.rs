//! Handler types and dependencies

use std::sync::Arc;

use portalcore::wizard::WizardOrchestrator;
use portalcore::PortalStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub orchestrator: Arc<WizardOrchestrator>,
    pub portals: Arc<dyn PortalStore>,
}

impl HandlerDeps {
    pub fn new(orchestrator: Arc<WizardOrchestrator>, portals: Arc<dyn PortalStore>) -> Self {
        Self { orchestrator, portals }
    }
}
