//! JSON REST handlers for pots.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use pothub_app::ports::{CommandPublisher, PotStore, UserDirectory};
use pothub_domain::error::{FieldIssue, NotFoundError, PotHubError, ValidationError};
use pothub_domain::history::HistoryEntry;
use pothub_domain::id::PotId;
use pothub_domain::pot::{Pot, PotDraft, PotPatch};
use pothub_domain::time::Timestamp;

use crate::api::{DataBody, MessageBody, MoistureBody};
use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

/// An id that is not even well-formed cannot name any pot — report the
/// same `NotFound` as a missing record so callers cannot distinguish
/// the cases.
fn parse_pot_id(raw: &str) -> Result<PotId, ApiError> {
    PotId::from_str(raw).map_err(|_| {
        ApiError::from(PotHubError::NotFound(NotFoundError {
            entity: "Pot",
            id: raw.to_string(),
        }))
    })
}

/// `GET /api/pots`
pub async fn list<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
) -> Result<Json<DataBody<Vec<Pot>>>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pots = state.pot_service.list_pots(owner).await?;
    Ok(Json(DataBody::new(pots)))
}

/// `GET /api/pots/{potId}`
pub async fn get<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
) -> Result<Json<DataBody<Pot>>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    let pot = state.pot_service.get_pot(owner, pot_id).await?;
    Ok(Json(DataBody::new(pot)))
}

/// `POST /api/pots`
pub async fn create<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Json(draft): Json<PotDraft>,
) -> Result<(StatusCode, Json<DataBody<Pot>>), ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let created = state.pot_service.create_pot(owner, draft).await?;
    Ok((StatusCode::CREATED, Json(DataBody::new(created))))
}

/// `PUT /api/pots/{potId}`
pub async fn update<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
    Json(patch): Json<PotPatch>,
) -> Result<Json<DataBody<Pot>>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    let updated = state.pot_service.update_pot(owner, pot_id, patch).await?;
    Ok(Json(DataBody::new(updated)))
}

/// `DELETE /api/pots/{potId}`
pub async fn delete<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    state.pot_service.delete_pot(owner, pot_id).await?;
    Ok(Json(MessageBody::new(format!("pot {pot_id} deleted"))))
}

/// Request body for recording a watering event.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WateringRequest {
    pub water_amount: Option<f64>,
    pub date: Option<Timestamp>,
}

/// `GET /api/pots/{potId}/watering`
pub async fn watering_history<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
) -> Result<Json<DataBody<Vec<HistoryEntry>>>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    let history = state.pot_service.watering_history(owner, pot_id).await?;
    Ok(Json(DataBody::new(history)))
}

/// `POST /api/pots/{potId}/watering`
pub async fn record_watering<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
    Json(req): Json<WateringRequest>,
) -> Result<(StatusCode, Json<DataBody<HistoryEntry>>), ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    let amount = req.water_amount.ok_or_else(|| {
        ApiError::from(PotHubError::Validation(ValidationError::new(vec![
            FieldIssue::Missing("waterAmount"),
        ])))
    })?;
    let entry = state
        .pot_service
        .record_watering(owner, pot_id, amount, req.date)
        .await?;
    Ok((StatusCode::CREATED, Json(DataBody::new(entry))))
}

/// `POST /api/pots/{potId}/moisture`
///
/// Returns as soon as the check command is handed to the transport.
/// The device's reply — if any — lands in the pot's history later.
pub async fn request_check<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    state.moisture_service.request_check(owner, pot_id).await?;
    Ok(Json(MessageBody::new("soil moisture check requested")))
}

/// `GET /api/pots/{potId}/moisture`
pub async fn latest_moisture<S, U, P>(
    State(state): State<AppState<S, U, P>>,
    Owner(owner): Owner,
    Path(pot_id): Path<String>,
) -> Result<Json<MoistureBody>, ApiError>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let pot_id = parse_pot_id(&pot_id)?;
    let reading = state.pot_service.latest_moisture(owner, pot_id).await?;
    Ok(Json(MoistureBody {
        success: true,
        soil_moisture: reading.soil_moisture,
    }))
}
