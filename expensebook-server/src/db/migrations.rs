//! Database migrations for the record collections
//!
//! Idempotent; run on every handshake. CHECK constraints mirror the schema
//! bounds and UNIQUE constraints back the uniqueness rules at write time.

use sqlx::PgPool;

/// Unique constraint names, mapped back to schema fields on conflict
pub const CATEGORIES_NAME_KEY: &str = "categories_name_key";
pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running store migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL CHECK (char_length(title) BETWEEN 4 AND 20),
            amount DOUBLE PRECISION NOT NULL CHECK (amount >= 0),
            category TEXT NOT NULL CHECK (char_length(category) BETWEEN 4 AND 20),
            date TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL CHECK (char_length(name) BETWEEN 4 AND 20),
            category_type TEXT NOT NULL CHECK (category_type IN ('expense', 'income')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT categories_name_key UNIQUE (name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            username TEXT NOT NULL CHECK (char_length(username) BETWEEN 4 AND 20),
            email TEXT NOT NULL CHECK (char_length(email) BETWEEN 4 AND 20),
            password TEXT NOT NULL CHECK (char_length(password) BETWEEN 4 AND 20),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT users_username_key UNIQUE (username),
            CONSTRAINT users_email_key UNIQUE (email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Store-native order for list reads
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_expenses_created ON expenses(created_at, id)")
        .execute(pool)
        .await?;

    tracing::info!("Store migrations complete");
    Ok(())
}
