//! Database schema management for `thermal-monitoring-api`.
//!
//! Ensures required tables, indexes and triggers exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Statements run in order inside one transaction. Each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              SERIAL PRIMARY KEY,
        username        VARCHAR(50)  NOT NULL UNIQUE,
        email           VARCHAR(100) NOT NULL UNIQUE,
        hashed_password VARCHAR(255) NOT NULL,
        full_name       VARCHAR(100),
        is_active       BOOLEAN      NOT NULL DEFAULT TRUE,
        is_admin        BOOLEAN      NOT NULL DEFAULT FALSE,
        created_at      TIMESTAMPTZ  NOT NULL DEFAULT now(),
        updated_at      TIMESTAMPTZ  NOT NULL DEFAULT now()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS detections (
        id             SERIAL PRIMARY KEY,
        detection_type VARCHAR(50)      NOT NULL,
        confidence     DOUBLE PRECISION NOT NULL,
        bbox_x         INTEGER,
        bbox_y         INTEGER,
        bbox_width     INTEGER,
        bbox_height    INTEGER,
        image_path     VARCHAR(255),
        camera_id      VARCHAR(50),
        processed      BOOLEAN          NOT NULL DEFAULT FALSE,
        timestamp      TIMESTAMPTZ,
        created_at     TIMESTAMPTZ      NOT NULL DEFAULT now()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS weather_data (
        id             SERIAL PRIMARY KEY,
        temperature    DOUBLE PRECISION,
        humidity       DOUBLE PRECISION,
        wind_speed     DOUBLE PRECISION,
        wind_direction INTEGER,
        pressure       DOUBLE PRECISION,
        rainfall       DOUBLE PRECISION,
        sensor_id      VARCHAR(50),
        timestamp      TIMESTAMPTZ,
        created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    "#,
    "CREATE INDEX IF NOT EXISTS ix_detections_detection_type ON detections (detection_type);",
    "CREATE INDEX IF NOT EXISTS ix_detections_camera_id ON detections (camera_id);",
    "CREATE INDEX IF NOT EXISTS ix_detections_processed ON detections (processed);",
    "CREATE INDEX IF NOT EXISTS ix_detections_created_at ON detections (created_at);",
    "CREATE INDEX IF NOT EXISTS ix_weather_data_sensor_id ON weather_data (sensor_id);",
    "CREATE INDEX IF NOT EXISTS ix_weather_data_created_at ON weather_data (created_at);",
    r#"
    CREATE OR REPLACE FUNCTION set_updated_at() RETURNS TRIGGER AS $$
    BEGIN
        NEW.updated_at = now();
        RETURN NEW;
    END;
    $$ LANGUAGE plpgsql;
    "#,
    "DROP TRIGGER IF EXISTS users_set_updated_at ON users;",
    r#"
    CREATE TRIGGER users_set_updated_at
        BEFORE UPDATE ON users
        FOR EACH ROW EXECUTE FUNCTION set_updated_at();
    "#,
];

/// Create or update the database schema (idempotent).
///
/// Creates `users`, `detections` and `weather_data` with their indexes, and the
/// trigger that refreshes `users.updated_at` on every update. Safe to call on
/// every startup.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Insert the `admin` account if no account with that username exists.
///
/// Only called when an administrator password was configured; there is no
/// built-in default credential.
pub async fn seed_admin(pool: &PgPool, email: &str, hashed_password: &str) -> Result<bool> {
    // ---
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, hashed_password, full_name, is_admin, is_active)
        VALUES ('admin', $1, $2, 'System Administrator', TRUE, TRUE)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(email)
    .bind(hashed_password)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
