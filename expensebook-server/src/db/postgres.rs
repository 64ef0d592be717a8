//! PostgreSQL collections
//!
//! - Reads return rows in creation order
//! - Inserts rely on DB constraints; a unique violation maps back to the
//!   schema field that caused it

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::collections::{Collections, DbError};
use super::migrations::{CATEGORIES_NAME_KEY, USERS_EMAIL_KEY, USERS_USERNAME_KEY};
use crate::models::{Category, CategoryType, Expense, RecordKind, User};

/// Collections backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgCollections {
    pool: PgPool,
}

impl PgCollections {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn expense_from_row(row: &PgRow) -> Result<Expense, sqlx::Error> {
    Ok(Expense {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        amount: row.try_get("amount")?,
        category: row.try_get("category")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    let raw_type: String = row.try_get("category_type")?;
    let kind = CategoryType::parse(&raw_type).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "category_type".into(),
        source: format!("unknown category type '{}'", raw_type).into(),
    })?;

    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Schema field guarded by a unique constraint
fn unique_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        CATEGORIES_NAME_KEY => Some("name"),
        USERS_USERNAME_KEY => Some("username"),
        USERS_EMAIL_KEY => Some("email"),
        _ => None,
    }
}

fn map_insert_error(kind: RecordKind, err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = db_err.constraint().and_then(unique_field).unwrap_or("_id");
            return DbError::Duplicate { kind, field };
        }
    }
    DbError::Sqlx(err)
}

#[async_trait]
impl Collections for PgCollections {
    async fn find_expenses(&self) -> Result<Vec<Expense>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, amount, category, date, created_at, updated_at
            FROM expenses
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let expenses = rows
            .iter()
            .map(expense_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = expenses.len(), "loaded expenses");
        Ok(expenses)
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, title, amount, category, date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(expense.id)
        .bind(&expense.title)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(expense.date)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(RecordKind::Expense, e))?;

        Ok(())
    }

    async fn find_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category_type, created_at, updated_at
            FROM categories
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let categories = rows
            .iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, category_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(RecordKind::Category, e))?;

        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(RecordKind::User, e))?;

        Ok(())
    }

    async fn exists(
        &self,
        kind: RecordKind,
        field: &'static str,
        value: &str,
    ) -> Result<bool, DbError> {
        // Identifiers are fixed per (kind, field); only the value is bound
        let sql = match (kind, field) {
            (RecordKind::Category, "name") => {
                "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)"
            }
            (RecordKind::User, "username") => {
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"
            }
            (RecordKind::User, "email") => "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
            _ => return Err(DbError::UnknownField { kind, field }),
        };

        let found: bool = sqlx::query_scalar(sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }
}
