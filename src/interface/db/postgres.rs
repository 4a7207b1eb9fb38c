use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::shared::config::DatabaseConfig;
use crate::shared::entities::{
    AuditEntry, CallId, Prefix, ReplacementPriority, ReviewRecord, SimFlag, SimId,
};
use crate::shared::ports::{
    BlacklistFuture, BlacklistPort, BlacklistPortError, CallRecordError, CallRecordFuture,
    CallRecordPort, RouteSourceError, RouteSourceFuture, RouteSourcePort, SimRegistryError,
    SimRegistryFuture, SimRegistryPort,
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);
const REPLACEMENT_REASON: &str = "Blocked by operator";

pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    pub async fn new(database_url: String, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let Some(url) = config.url.clone() else {
            return Err(sqlx::Error::Configuration("DATABASE_URL is not set".into()));
        };
        Self::new(url, config.max_connections).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BlacklistPort for PostgresAdapter {
    fn is_blacklisted(&self, number: &str) -> BlacklistFuture<bool> {
        let pool = self.pool.clone();
        let number = number.to_string();
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT EXISTS (SELECT 1 FROM blacklist WHERE phone_number = $1) AS listed",
            )
            .bind(number)
            .fetch_one(&pool)
            .await
            .map_err(map_blacklist_err)?;
            row.try_get("listed").map_err(map_blacklist_err)
        })
    }
}

impl RouteSourcePort for PostgresAdapter {
    fn get_active_prefixes(&self) -> RouteSourceFuture<Vec<Prefix>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT prefix, gateway_id, is_active
                 FROM prefixes
                 WHERE is_active = TRUE
                 ORDER BY LENGTH(prefix) DESC",
            )
            .fetch_all(&pool)
            .await
            .map_err(map_route_err)?;

            let mut prefixes = Vec::with_capacity(rows.len());
            for row in rows {
                let value: String = row.try_get("prefix").map_err(map_route_err)?;
                let gateway_id: String = row.try_get("gateway_id").map_err(map_route_err)?;
                let active: bool = row.try_get("is_active").map_err(map_route_err)?;
                prefixes.push(Prefix::new(value, gateway_id, active));
            }
            Ok(prefixes)
        })
    }
}

impl SimRegistryPort for PostgresAdapter {
    fn sim_for_call(&self, call_id: &CallId) -> SimRegistryFuture<Option<SimId>> {
        let pool = self.pool.clone();
        let call_id = call_id.as_str().to_string();
        Box::pin(async move {
            let row = sqlx::query("SELECT sim_id FROM sip_calls WHERE call_id = $1 LIMIT 1")
                .bind(call_id)
                .fetch_optional(&pool)
                .await
                .map_err(map_sim_read_err)?;
            let Some(row) = row else {
                return Ok(None);
            };
            let sim_id: Option<String> = row.try_get("sim_id").map_err(map_sim_read_err)?;
            Ok(sim_id.filter(|id| !id.is_empty()).map(SimId::new))
        })
    }

    fn flag_sim(&self, flag: SimFlag) -> SimRegistryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "UPDATE sim_cards
                 SET status = 'flagged',
                     last_issue = $2,
                     flagged_at = $3,
                     updated_at = NOW()
                 WHERE sim_id = $1",
            )
            .bind(flag.sim_id.as_str())
            .bind(flag.issue)
            .bind(flag.flagged_at)
            .execute(&pool)
            .await
            .map_err(map_sim_write_err)?;
            Ok(())
        })
    }

    fn schedule_replacement(
        &self,
        sim_id: &SimId,
        priority: ReplacementPriority,
    ) -> SimRegistryFuture<()> {
        let pool = self.pool.clone();
        let sim_id = sim_id.as_str().to_string();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO sim_replacement_queue (sim_id, reason, priority, scheduled_at, status)
                 VALUES ($1, $2, $3, NOW(), 'pending')
                 ON CONFLICT (sim_id) DO UPDATE SET
                     priority = EXCLUDED.priority,
                     updated_at = NOW()",
            )
            .bind(sim_id)
            .bind(REPLACEMENT_REASON)
            .bind(priority.as_str())
            .execute(&pool)
            .await
            .map_err(map_sim_write_err)?;
            Ok(())
        })
    }
}

impl CallRecordPort for PostgresAdapter {
    fn record_block(&self, call_id: &CallId, reason: &str) -> CallRecordFuture<()> {
        let pool = self.pool.clone();
        let call_id = call_id.as_str().to_string();
        let reason = reason.to_string();
        Box::pin(async move {
            sqlx::query(
                "UPDATE sip_calls
                 SET status = 'blocked',
                     block_reason = $2,
                     ended_at = NOW(),
                     updated_at = NOW()
                 WHERE call_id = $1",
            )
            .bind(call_id)
            .bind(reason)
            .execute(&pool)
            .await
            .map_err(map_record_err)?;
            Ok(())
        })
    }

    fn record_review(&self, record: ReviewRecord) -> CallRecordFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO call_reviews
                     (id, call_id, category, confidence, reason, risk_score, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)",
            )
            .bind(record.id)
            .bind(record.call_id.as_str())
            .bind(record.category.as_str())
            .bind(record.confidence)
            .bind(record.reason)
            .bind(record.risk_score)
            .bind(record.created_at)
            .execute(&pool)
            .await
            .map_err(map_record_err)?;
            Ok(())
        })
    }

    fn append_audit_log(&self, entry: AuditEntry) -> CallRecordFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO voice_recognition_logs
                     (id, call_id, category, action, confidence, reason, risk_score, keywords, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(entry.id)
            .bind(entry.call_id.as_str())
            .bind(entry.category)
            .bind(entry.action)
            .bind(entry.confidence)
            .bind(entry.reason)
            .bind(entry.risk_score)
            .bind(entry.keywords)
            .bind(entry.created_at)
            .execute(&pool)
            .await
            .map_err(map_record_err)?;
            Ok(())
        })
    }

    fn mark_routed_to_agent(&self, call_id: &CallId) -> CallRecordFuture<()> {
        let pool = self.pool.clone();
        let call_id = call_id.as_str().to_string();
        Box::pin(async move {
            sqlx::query(
                "UPDATE sip_calls
                 SET status = 'routed_to_ai',
                     routed_at = NOW(),
                     updated_at = NOW()
                 WHERE call_id = $1",
            )
            .bind(call_id)
            .execute(&pool)
            .await
            .map_err(map_record_err)?;
            Ok(())
        })
    }
}

fn map_blacklist_err(err: sqlx::Error) -> BlacklistPortError {
    BlacklistPortError::ReadFailed(err.to_string())
}

fn map_route_err(err: sqlx::Error) -> RouteSourceError {
    RouteSourceError::ReadFailed(err.to_string())
}

fn map_sim_read_err(err: sqlx::Error) -> SimRegistryError {
    SimRegistryError::ReadFailed(err.to_string())
}

fn map_sim_write_err(err: sqlx::Error) -> SimRegistryError {
    SimRegistryError::WriteFailed(err.to_string())
}

fn map_record_err(err: sqlx::Error) -> CallRecordError {
    CallRecordError::WriteFailed(err.to_string())
}
