//! `SQLite` implementation of the `PotStore` port.

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use pothub_app::ports::PotStore;
use pothub_domain::error::PotHubError;
use pothub_domain::history::HistoryEntry;
use pothub_domain::id::{HistoryEntryId, PotId, UserId};
use pothub_domain::pot::{Dimensions, OtherParams, Pot, Shape};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without
/// polluting domain structs with database concerns. The watering history
/// lives in its own table and is attached after the row decode.
struct PotRow(Pot);

impl<'r> FromRow<'r, SqliteRow> for PotRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner: String = row.try_get("owner")?;
        let pot_name: String = row.try_get("pot_name")?;
        let flower_name: String = row.try_get("flower_name")?;
        let water_amount: f64 = row.try_get("water_amount")?;
        let watering_frequency: i64 = row.try_get("watering_frequency")?;
        let pot_size: String = row.try_get("pot_size")?;
        let shape_str: String = row.try_get("shape")?;
        let dimensions_json: String = row.try_get("dimensions")?;
        let other_params_json: Option<String> = row.try_get("other_params")?;
        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let id = PotId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let owner = UserId::from_str(&owner).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let shape: Shape = serde_json::from_str(&format!("\"{shape_str}\""))
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let dimensions: Dimensions = serde_json::from_str(&dimensions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let other_params: Option<OtherParams> = other_params_json
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let watering_frequency = u32::try_from(watering_frequency)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Pot {
            id,
            owner,
            pot_name,
            flower_name,
            water_amount,
            watering_frequency,
            pot_size,
            shape,
            dimensions,
            other_params,
            watering_history: Vec::new(),
            created_at,
            updated_at,
        }))
    }
}

struct HistoryRow {
    pot_id: PotId,
    entry: HistoryEntry,
}

impl<'r> FromRow<'r, SqliteRow> for HistoryRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let pot_id: String = row.try_get("pot_id")?;
        let date_str: String = row.try_get("date")?;
        let soil_moisture: Option<f64> = row.try_get("soil_moisture")?;
        let water_amount: Option<f64> = row.try_get("water_amount")?;

        let id =
            HistoryEntryId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let pot_id = PotId::from_str(&pot_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let date = chrono::DateTime::parse_from_rfc3339(&date_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self {
            pot_id,
            entry: HistoryEntry {
                id,
                date,
                soil_moisture,
                water_amount,
            },
        })
    }
}

const INSERT: &str = r"
    INSERT INTO pots (id, owner, pot_name, flower_name, water_amount, watering_frequency,
                      pot_size, shape, dimensions, other_params, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_OWNER: &str = "SELECT * FROM pots WHERE owner = ? ORDER BY rowid";
const SELECT_OWNED: &str = "SELECT * FROM pots WHERE id = ? AND owner = ?";

const UPDATE_OWNED: &str = r"
    UPDATE pots
    SET pot_name = ?, flower_name = ?, water_amount = ?, watering_frequency = ?,
        pot_size = ?, shape = ?, dimensions = ?, other_params = ?, updated_at = ?
    WHERE id = ? AND owner = ?
";

const DELETE_OWNED: &str = "DELETE FROM pots WHERE id = ? AND owner = ?";
const DELETE_HISTORY: &str = "DELETE FROM watering_history WHERE pot_id = ? AND owner = ?";

const SELECT_HISTORY_BY_OWNER: &str =
    "SELECT * FROM watering_history WHERE owner = ? ORDER BY rowid";
const SELECT_HISTORY_OWNED: &str =
    "SELECT * FROM watering_history WHERE pot_id = ? AND owner = ? ORDER BY rowid";

// The WHERE EXISTS guard makes the append and the ownership check one
// atomic statement: a reply racing a delete either lands before the
// delete (and is removed with the pot) or inserts nothing.
const APPEND_HISTORY: &str = r"
    INSERT INTO watering_history (id, pot_id, owner, date, soil_moisture, water_amount)
    SELECT ?1, ?2, ?3, ?4, ?5, ?6
    WHERE EXISTS (SELECT 1 FROM pots WHERE id = ?2 AND owner = ?3)
";

/// `SQLite`-backed pot store.
pub struct SqlitePotStore {
    pool: SqlitePool,
}

impl SqlitePotStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn shape_text(shape: Shape) -> Result<String, StorageError> {
        let quoted = serde_json::to_string(&shape)?;
        Ok(quoted.trim_matches('"').to_string())
    }
}

impl PotStore for SqlitePotStore {
    async fn find_owned(&self, owner: UserId) -> Result<Vec<Pot>, PotHubError> {
        let rows: Vec<PotRow> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let history: Vec<HistoryRow> = sqlx::query_as(SELECT_HISTORY_BY_OWNER)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let mut by_pot: HashMap<PotId, Vec<HistoryEntry>> = HashMap::new();
        for row in history {
            by_pot.entry(row.pot_id).or_default().push(row.entry);
        }

        Ok(rows
            .into_iter()
            .map(|PotRow(mut pot)| {
                pot.watering_history = by_pot.remove(&pot.id).unwrap_or_default();
                pot
            })
            .collect())
    }

    async fn get_owned(&self, owner: UserId, pot: PotId) -> Result<Option<Pot>, PotHubError> {
        let row: Option<PotRow> = sqlx::query_as(SELECT_OWNED)
            .bind(pot.to_string())
            .bind(owner.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let Some(PotRow(mut record)) = row else {
            return Ok(None);
        };

        let history: Vec<HistoryRow> = sqlx::query_as(SELECT_HISTORY_OWNED)
            .bind(pot.to_string())
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        record.watering_history = history.into_iter().map(|row| row.entry).collect();

        Ok(Some(record))
    }

    async fn insert(&self, pot: Pot) -> Result<Pot, PotHubError> {
        let dimensions_json =
            serde_json::to_string(&pot.dimensions).map_err(StorageError::from)?;
        let other_params_json = pot
            .other_params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(pot.id.to_string())
            .bind(pot.owner.to_string())
            .bind(&pot.pot_name)
            .bind(&pot.flower_name)
            .bind(pot.water_amount)
            .bind(i64::from(pot.watering_frequency))
            .bind(&pot.pot_size)
            .bind(Self::shape_text(pot.shape)?)
            .bind(&dimensions_json)
            .bind(&other_params_json)
            .bind(pot.created_at.to_rfc3339())
            .bind(pot.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(pot)
    }

    async fn update_owned(&self, owner: UserId, pot: Pot) -> Result<Option<Pot>, PotHubError> {
        let dimensions_json =
            serde_json::to_string(&pot.dimensions).map_err(StorageError::from)?;
        let other_params_json = pot
            .other_params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE_OWNED)
            .bind(&pot.pot_name)
            .bind(&pot.flower_name)
            .bind(pot.water_amount)
            .bind(i64::from(pot.watering_frequency))
            .bind(&pot.pot_size)
            .bind(Self::shape_text(pot.shape)?)
            .bind(&dimensions_json)
            .bind(&other_params_json)
            .bind(pot.updated_at.to_rfc3339())
            .bind(pot.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(pot))
        }
    }

    async fn delete_owned(&self, owner: UserId, pot: PotId) -> Result<bool, PotHubError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        sqlx::query(DELETE_HISTORY)
            .bind(pot.to_string())
            .bind(owner.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        let result = sqlx::query(DELETE_OWNED)
            .bind(pot.to_string())
            .bind(owner.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_history(
        &self,
        owner: UserId,
        pot: PotId,
        entry: HistoryEntry,
    ) -> Result<bool, PotHubError> {
        let result = sqlx::query(APPEND_HISTORY)
            .bind(entry.id.to_string())
            .bind(pot.to_string())
            .bind(owner.to_string())
            .bind(entry.date.to_rfc3339())
            .bind(entry.soil_moisture)
            .bind(entry.water_amount)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
