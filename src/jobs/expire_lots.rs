//! Daily sweep marking past-date lots as expired.

use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

pub struct ExpireLotsJob {
    pool: PgPool,
}

impl ExpireLotsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk transition to `vencido`. Paid and terminal states are left alone so
    /// a completed sale is never overwritten by the sweep.
    async fn expire_due_lots(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET state = 'vencido', hold_expires_at = NULL, updated_at = now()
            WHERE expires_on < CURRENT_DATE
              AND state IN ('disponible', 'reservado')
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl Job for ExpireLotsJob {
    fn name(&self) -> &'static str {
        "expire_lots"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let expired = self.expire_due_lots().await?;
        if expired > 0 {
            info!(expired, "marked past-date lots as vencido");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_daily() {
        assert_eq!(
            JobFrequency::Daily.period(),
            std::time::Duration::from_secs(86400)
        );
    }
}
