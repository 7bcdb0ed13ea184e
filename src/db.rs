use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Creates the three tables when missing. The directory and shift tables are
/// filled by HR; only `attendance_log` is written by the portal.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            employee_id   VARCHAR(64)  NOT NULL PRIMARY KEY,
            employee_name VARCHAR(255) NOT NULL,
            email         VARCHAR(255) NOT NULL,
            shift_name    VARCHAR(64)  NOT NULL,
            status        VARCHAR(16)  NOT NULL DEFAULT 'Active',
            UNIQUE KEY uq_employees_email (email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shift_rules (
            shift_name   VARCHAR(64) NOT NULL PRIMARY KEY,
            full_day_hrs DOUBLE      NOT NULL,
            half_day_hrs DOUBLE      NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_log (
            id                BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            date              DATE         NOT NULL,
            employee_id       VARCHAR(64)  NOT NULL,
            employee_name     VARCHAR(255) NOT NULL,
            email             VARCHAR(255) NOT NULL,
            shift_name        VARCHAR(64)  NOT NULL,
            punch_in          DATETIME     NOT NULL,
            punch_out         DATETIME     NULL,
            work_hours        DOUBLE       NULL,
            attendance_status VARCHAR(16)  NULL,
            UNIQUE KEY uq_attendance_email_date (email, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
