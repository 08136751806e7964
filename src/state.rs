use std::sync::Arc;
use crate::gateway::GenerationGateway;
use crate::provider::TastingService;
// app's shared state

pub struct AppState {
    pub gateway: GenerationGateway,          // images, cached + deduplicated
    pub tasting: Arc<dyn TastingService>,    // pairing text and audio, uncached
}

impl AppState {
    pub fn new(gateway: GenerationGateway, tasting: Arc<dyn TastingService>) -> Self {
        Self { gateway, tasting }
    }
}
