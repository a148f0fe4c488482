//! JSON REST API handler modules and response envelopes.
//!
//! Every response uses the `{ "success": …, … }` envelope: `data` for
//! records, `message` for confirmations, `soilMoisture` for the latest
//! reading.

#[allow(clippy::missing_errors_doc)]
pub mod pots;

use axum::Router;
use axum::routing::get;
use serde::Serialize;

use pothub_app::ports::{CommandPublisher, PotStore, UserDirectory};

use crate::state::AppState;

/// Success envelope carrying a record or list.
#[derive(Serialize)]
pub struct DataBody<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope carrying a human-readable confirmation.
#[derive(Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Success envelope for the latest-moisture query.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoistureBody {
    pub success: bool,
    pub soil_moisture: f64,
}

/// Build the `/api` sub-router.
pub fn routes<S, U, P>() -> Router<AppState<S, U, P>>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/pots",
            get(pots::list::<S, U, P>).post(pots::create::<S, U, P>),
        )
        .route(
            "/pots/{potId}",
            get(pots::get::<S, U, P>)
                .put(pots::update::<S, U, P>)
                .delete(pots::delete::<S, U, P>),
        )
        .route(
            "/pots/{potId}/moisture",
            get(pots::latest_moisture::<S, U, P>).post(pots::request_check::<S, U, P>),
        )
        .route(
            "/pots/{potId}/watering",
            get(pots::watering_history::<S, U, P>).post(pots::record_watering::<S, U, P>),
        )
}
