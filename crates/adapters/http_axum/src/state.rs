//! Shared application state for axum handlers.

use std::sync::Arc;

use pothub_app::ports::{CommandPublisher, PotStore, UserDirectory};
use pothub_app::services::moisture_service::MoistureService;
use pothub_app::services::pot_service::PotService;

/// Application state shared across all axum handlers.
///
/// Generic over the store, user directory, and publisher types to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone` — only the `Arc` wrappers
/// are cloned. Both services share the same store and publisher handles.
pub struct AppState<S, U, P> {
    /// Pot CRUD, latest-moisture query, and pot-list fan-out.
    pub pot_service: Arc<PotService<S, U, P>>,
    /// Moisture-check dispatch and reply ingestion.
    pub moisture_service: Arc<MoistureService<S, P>>,
}

impl<S, U, P> Clone for AppState<S, U, P> {
    fn clone(&self) -> Self {
        Self {
            pot_service: Arc::clone(&self.pot_service),
            moisture_service: Arc::clone(&self.moisture_service),
        }
    }
}

impl<S, U, P> AppState<S, U, P>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    /// Wire both services around one shared store and publisher.
    pub fn new(store: S, users: U, publisher: P) -> Self {
        let store = Arc::new(store);
        let publisher = Arc::new(publisher);
        Self {
            pot_service: Arc::new(PotService::new(
                Arc::clone(&store),
                Arc::new(users),
                Arc::clone(&publisher),
            )),
            moisture_service: Arc::new(MoistureService::new(store, publisher)),
        }
    }
}
