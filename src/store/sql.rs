use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use std::time::Duration;

use crate::model::{Id, NewSale, Rule, Sale, Vendor, DATE_FORMAT};
use crate::store::traits::CommissionStore;

const CREATE_SALE_ATTEMPTS: u32 = 5;

// Portable DDL: runs unchanged on PostgreSQL and SQLite. Dates are ISO text.
const CREATE_RULES: &str = r#"
    CREATE TABLE IF NOT EXISTS rules (
        id BIGINT PRIMARY KEY,
        minimum_amount DOUBLE PRECISION NOT NULL CHECK (minimum_amount >= 0),
        commission_rate DOUBLE PRECISION NOT NULL CHECK (commission_rate > 0 AND commission_rate <= 1)
    )
"#;

const CREATE_VENDORS: &str = r#"
    CREATE TABLE IF NOT EXISTS vendors (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL CHECK (name <> '')
    )
"#;

const CREATE_SALES: &str = r#"
    CREATE TABLE IF NOT EXISTS sales (
        id BIGINT PRIMARY KEY,
        sale_date TEXT NOT NULL,
        vendor_id BIGINT NOT NULL REFERENCES vendors (id),
        quota_amount DOUBLE PRECISION NOT NULL CHECK (quota_amount >= 0)
    )
"#;

/// SQL-backed store over an sqlx `AnyPool`, serving `postgres://` and `sqlite:` URLs.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
}

impl SqlStore {
    /// Connect to the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new().max_connections(max_connections);
        if database_url.contains(":memory:") {
            // Each in-memory connection is its own database, alive only while open.
            options = options
                .max_connections(1)
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None);
        }

        let pool = options
            .connect(database_url)
            .await
            .context("Failed to create database connection pool")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn rule_from_row(row: &AnyRow) -> Result<Rule> {
    Ok(Rule {
        id: row.try_get("id")?,
        minimum_amount: row.try_get("minimum_amount")?,
        commission_rate: row.try_get("commission_rate")?,
    })
}

fn vendor_from_row(row: &AnyRow) -> Result<Vendor> {
    Ok(Vendor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn sale_from_row(row: &AnyRow) -> Result<Sale> {
    let raw_date: String = row.try_get("sale_date")?;
    let sale_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
        .with_context(|| format!("Invalid sale_date '{}' in sales table", raw_date))?;

    Ok(Sale {
        id: row.try_get("id")?,
        sale_date,
        vendor_id: row.try_get("vendor_id")?,
        quota_amount: row.try_get("quota_amount")?,
    })
}

#[async_trait::async_trait]
impl CommissionStore for SqlStore {
    async fn ensure_schema(&self) -> Result<()> {
        // vendors must exist before sales references it
        for (table, ddl) in [
            ("rules", CREATE_RULES),
            ("vendors", CREATE_VENDORS),
            ("sales", CREATE_SALES),
        ] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create table {}", table))?;
        }

        Ok(())
    }

    async fn has_vendors(&self) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM vendors LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to probe vendors table")?;

        Ok(row.is_some())
    }

    async fn insert_batch(&self, rules: &[Rule], vendors: &[Vendor], sales: &[Sale]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for rule in rules {
            sqlx::query("INSERT INTO rules (id, minimum_amount, commission_rate) VALUES ($1, $2, $3)")
                .bind(rule.id)
                .bind(rule.minimum_amount)
                .bind(rule.commission_rate)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert rule {}", rule.id))?;
        }

        for vendor in vendors {
            sqlx::query("INSERT INTO vendors (id, name) VALUES ($1, $2)")
                .bind(vendor.id)
                .bind(vendor.name.as_str())
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert vendor {}", vendor.id))?;
        }

        for sale in sales {
            sqlx::query(
                "INSERT INTO sales (id, sale_date, vendor_id, quota_amount) VALUES ($1, $2, $3, $4)",
            )
            .bind(sale.id)
            .bind(sale.sale_date.format(DATE_FORMAT).to_string())
            .bind(sale.vendor_id)
            .bind(sale.quota_amount)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert sale {}", sale.id))?;
        }

        // Dropping `tx` on any error above rolls the whole batch back.
        tx.commit().await.context("Failed to commit batch")?;

        Ok(())
    }

    async fn list_rules(&self) -> Result<Vec<Rule>> {
        let rows = sqlx::query("SELECT id, minimum_amount, commission_rate FROM rules ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list rules")?;

        rows.iter().map(rule_from_row).collect()
    }

    async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let rows = sqlx::query("SELECT id, name FROM vendors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list vendors")?;

        rows.iter().map(vendor_from_row).collect()
    }

    async fn get_vendor(&self, id: Id) -> Result<Option<Vendor>> {
        let row = sqlx::query("SELECT id, name FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch vendor")?;

        let Some(row) = row else {
            return Ok(None);
        };

        vendor_from_row(&row).map(Some)
    }

    async fn list_sales(&self) -> Result<Vec<Sale>> {
        let rows = sqlx::query("SELECT id, sale_date, vendor_id, quota_amount FROM sales ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;

        rows.iter().map(sale_from_row).collect()
    }

    async fn list_sales_for_vendor(&self, vendor_id: Id) -> Result<Vec<Sale>> {
        let rows = sqlx::query(
            "SELECT id, sale_date, vendor_id, quota_amount FROM sales WHERE vendor_id = $1 ORDER BY id",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list sales for vendor")?;

        rows.iter().map(sale_from_row).collect()
    }

    async fn create_sale(&self, sale: NewSale) -> Result<Sale> {
        let sale_date = sale.sale_date.format(DATE_FORMAT).to_string();

        // Id allocation and insert are one statement, so SQLite takes the write
        // lock up front. Concurrent PostgreSQL inserts may still pick the same
        // id; those retry against the new maximum.
        let mut attempt = 1;
        let row = loop {
            let result = sqlx::query(
                r#"
                INSERT INTO sales (id, sale_date, vendor_id, quota_amount)
                SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3 FROM sales
                RETURNING id
                "#,
            )
            .bind(sale_date.as_str())
            .bind(sale.vendor_id)
            .bind(sale.quota_amount)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => break row,
                Err(e) if attempt < CREATE_SALE_ATTEMPTS && is_unique_violation(&e) => {
                    log::debug!("Sale id collision on attempt {}; retrying", attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e).context("Failed to insert sale"),
            }
        };

        let id: Id = row.try_get("id")?;
        Ok(Sale::new(id, sale.sale_date, sale.vendor_id, sale.quota_amount))
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
