use crate::core::ports::OfficeRegistry;
use crate::model::office::OfficeGeofence;
use anyhow::Context;
use async_trait::async_trait;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

/// Single cache slot holding the active-geofence snapshot.
const SNAPSHOT_KEY: u8 = 0;

/// MySQL-backed office registry with a short-TTL snapshot cache. Punch
/// validation reads the cached list as a point-in-time snapshot; admin
/// mutations call [`MySqlOfficeRegistry::invalidate`] so the next read sees
/// fresh data without waiting out the TTL.
pub struct MySqlOfficeRegistry {
    pool: MySqlPool,
    cache: Cache<u8, Arc<Vec<OfficeGeofence>>>,
}

impl MySqlOfficeRegistry {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { pool, cache }
    }

    async fn load(&self) -> anyhow::Result<Arc<Vec<OfficeGeofence>>> {
        let offices = sqlx::query_as::<_, OfficeGeofence>(
            r#"
            SELECT id, name, latitude, longitude, radius_m, active
            FROM office_geofences
            WHERE active = 1
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load active geofences")?;

        Ok(Arc::new(offices))
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(&SNAPSHOT_KEY).await;
    }

    /// Pre-load the snapshot at startup so the first punch does not pay the
    /// DB round trip.
    pub async fn warmup(&self) -> anyhow::Result<()> {
        let offices = self.load().await?;
        tracing::info!(count = offices.len(), "Geofence cache warmup complete");
        self.cache.insert(SNAPSHOT_KEY, offices).await;
        Ok(())
    }
}

#[async_trait]
impl OfficeRegistry for MySqlOfficeRegistry {
    async fn active_geofences(&self) -> anyhow::Result<Vec<OfficeGeofence>> {
        if let Some(snapshot) = self.cache.get(&SNAPSHOT_KEY).await {
            return Ok(snapshot.as_ref().clone());
        }

        let snapshot = self.load().await?;
        self.cache.insert(SNAPSHOT_KEY, snapshot.clone()).await;
        Ok(snapshot.as_ref().clone())
    }
}
