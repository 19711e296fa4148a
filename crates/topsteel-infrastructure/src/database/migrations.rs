//! Embedded schema migrations

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_parameters_policy_applies_to_owner() {
        let sql: String = MIGRATOR.iter().map(|m| m.sql.as_ref()).collect::<Vec<_>>().join("\n");

        assert!(sql.contains("ALTER TABLE parameters_client ENABLE ROW LEVEL SECURITY"));
        assert!(sql.contains("ALTER TABLE parameters_client FORCE ROW LEVEL SECURITY"));
    }
}
