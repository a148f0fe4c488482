//! `SQLite` implementation of the `UserDirectory` port.

use sqlx::SqlitePool;

use pothub_app::ports::UserDirectory;
use pothub_domain::error::PotHubError;
use pothub_domain::id::{PotId, UserId};

use crate::error::StorageError;

const ATTACH: &str = "INSERT OR IGNORE INTO user_pots (user_id, pot_id) VALUES (?, ?)";
const DETACH: &str = "DELETE FROM user_pots WHERE user_id = ? AND pot_id = ?";
const SELECT_FOR_USER: &str = "SELECT pot_id FROM user_pots WHERE user_id = ? ORDER BY rowid";

/// `SQLite`-backed reciprocal pot list.
pub struct SqliteUserDirectory {
    pool: SqlitePool,
}

impl SqliteUserDirectory {
    /// Create a new directory using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Pot ids recorded for `owner`, in attach order.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the query fails.
    pub async fn pots_of(&self, owner: UserId) -> Result<Vec<PotId>, PotHubError> {
        let rows: Vec<(String,)> = sqlx::query_as(SELECT_FOR_USER)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|(id,)| {
                id.parse().map_err(|err: uuid::Error| {
                    PotHubError::from(StorageError::Database(sqlx::Error::Decode(Box::new(err))))
                })
            })
            .collect()
    }
}

impl UserDirectory for SqliteUserDirectory {
    async fn attach_pot(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        sqlx::query(ATTACH)
            .bind(owner.to_string())
            .bind(pot.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn detach_pot(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        sqlx::query(DETACH)
            .bind(owner.to_string())
            .bind(pot.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
