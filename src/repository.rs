//! SQLite persistence for part identities and their price observations.
//!
//! Each category owns a parts table and a prices table. Table names come from
//! [`PartCategory::tables`], so the SQL below only ever interpolates those
//! fixed identifiers; every value is bound.

use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::models::{
    CategorySummary, PartCategory, PartIdentity, PartListing, Price, PriceObservation, SearchRecord, SearchScope,
};
use crate::utils::{AppError, Result};

#[derive(Clone)]
pub struct PartRepository {
    pool: SqlitePool,
}

impl PartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database named by the configured URL.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        debug!(url = %config.url, "Connected to parts database");
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for category in PartCategory::ALL {
            let tables = category.tables();

            sqlx::query(&format!(
                r"
                CREATE TABLE IF NOT EXISTS {parts} (
                    id INTEGER PRIMARY KEY,
                    brand TEXT NOT NULL,
                    name TEXT NOT NULL UNIQUE
                )
                ",
                parts = tables.parts
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                r"
                CREATE TABLE IF NOT EXISTS {prices} (
                    id INTEGER PRIMARY KEY,
                    {fk} INTEGER NOT NULL REFERENCES {parts}(id),
                    website TEXT NOT NULL,
                    price TEXT NOT NULL,
                    link TEXT NOT NULL,
                    price_date TEXT NOT NULL
                )
                ",
                prices = tables.prices,
                fk = tables.foreign_key,
                parts = tables.parts
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{prices}_{fk} ON {prices}({fk})",
                prices = tables.prices,
                fk = tables.foreign_key
            ))
            .execute(&self.pool)
            .await?;
        }

        info!("Database schema ready");
        Ok(())
    }

    /// True only when every category's tables exist.
    pub async fn schema_ready(&self) -> Result<bool> {
        Ok(self.first_missing_table().await?.is_none())
    }

    async fn first_missing_table(&self) -> Result<Option<&'static str>> {
        for category in PartCategory::ALL {
            let tables = category.tables();
            for table in [tables.parts, tables.prices] {
                let exists: Option<String> =
                    sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                        .bind(table)
                        .fetch_optional(&self.pool)
                        .await?;

                if exists.is_none() {
                    return Ok(Some(table));
                }
            }
        }
        Ok(None)
    }

    /// Fails with `SchemaNotInitialized` naming the first missing table.
    pub async fn require_schema(&self) -> Result<()> {
        match self.first_missing_table().await? {
            Some(missing) => Err(AppError::SchemaNotInitialized {
                missing: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Inserts the part if its name is new and returns its id either way.
    /// The brand of an existing part is never changed.
    pub async fn upsert_part(&self, category: PartCategory, name: &str, brand: &str) -> Result<i64> {
        let tables = category.tables();

        sqlx::query(&format!(
            "INSERT INTO {} (brand, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
            tables.parts
        ))
        .bind(brand)
        .bind(name)
        .execute(&self.pool)
        .await?;

        let id: i64 = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE name = ?", tables.parts))
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Appends one observation; earlier observations are left untouched.
    pub async fn record_price(
        &self,
        category: PartCategory,
        part_id: i64,
        website: &str,
        link: &str,
        price: &Price,
        observed_on: NaiveDate,
    ) -> Result<i64> {
        let tables = category.tables();

        let result = sqlx::query(&format!(
            "INSERT INTO {} ({}, website, price, link, price_date) VALUES (?, ?, ?, ?, ?)",
            tables.prices, tables.foreign_key
        ))
        .bind(part_id)
        .bind(website)
        .bind(price.as_stored())
        .bind(link)
        .bind(observed_on)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn ingest(&self, listing: &PartListing) -> Result<i64> {
        let part_id = self
            .upsert_part(listing.category, &listing.name, &listing.brand)
            .await?;

        self.record_price(
            listing.category,
            part_id,
            &listing.website,
            &listing.link,
            &listing.price,
            listing.observed_on,
        )
        .await?;

        debug!(category = %listing.category, part_id, name = %listing.name, "Ingested listing");
        Ok(part_id)
    }

    pub async fn part(&self, category: PartCategory, part_id: i64) -> Result<Option<PartIdentity>> {
        self.require_schema().await?;
        let tables = category.tables();

        let row = sqlx::query(&format!("SELECT id, brand, name FROM {} WHERE id = ?", tables.parts))
            .bind(part_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<PartIdentity> {
            Ok(PartIdentity {
                id: row.try_get("id")?,
                category,
                brand: row.try_get("brand")?,
                name: row.try_get("name")?,
            })
        })
        .transpose()
    }

    /// Parts joined with their observations, ordered by name then observation
    /// order. The name filter is a case-insensitive substring match.
    pub async fn search(
        &self,
        category: PartCategory,
        name: Option<&str>,
        scope: SearchScope,
    ) -> Result<Vec<SearchRecord>> {
        self.require_schema().await?;
        let tables = category.tables();

        let latest_only = match scope {
            SearchScope::AllObservations => "",
            SearchScope::LatestOnly => {
                "AND o.id = (SELECT MAX(latest.id) FROM {prices} latest WHERE latest.{fk} = p.id)"
            }
        };
        let sql = format!(
            r"
            SELECT p.id AS part_id, p.name, p.brand, o.website, o.link, o.price, o.price_date
            FROM {{parts}} p
            JOIN {{prices}} o ON o.{{fk}} = p.id
            WHERE (? IS NULL OR p.name LIKE ? ESCAPE '\')
            {latest_only}
            ORDER BY p.name, o.id
            "
        )
        .replace("{parts}", tables.parts)
        .replace("{prices}", tables.prices)
        .replace("{fk}", tables.foreign_key);

        let pattern = name.map(like_pattern);

        let rows = sqlx::query(&sql)
            .bind(pattern.as_deref())
            .bind(pattern.as_deref())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| search_record(category, row)).collect()
    }

    /// Every observation of one part, oldest first.
    pub async fn price_history(&self, category: PartCategory, part_id: i64) -> Result<Vec<PriceObservation>> {
        self.require_schema().await?;
        let tables = category.tables();

        let rows = sqlx::query(&format!(
            "SELECT id, {fk} AS part_id, website, link, price, price_date FROM {prices} WHERE {fk} = ? ORDER BY id",
            fk = tables.foreign_key,
            prices = tables.prices
        ))
        .bind(part_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PriceObservation> {
                Ok(PriceObservation {
                    id: row.try_get("id")?,
                    part_id: row.try_get("part_id")?,
                    website: row.try_get("website")?,
                    link: row.try_get("link")?,
                    price: Price::from_stored(row.try_get::<&str, _>("price")?),
                    observed_on: row.try_get("price_date")?,
                })
            })
            .collect()
    }

    pub async fn summary(&self) -> Result<Vec<CategorySummary>> {
        self.require_schema().await?;

        let mut summaries = Vec::with_capacity(PartCategory::ALL.len());
        for category in PartCategory::ALL {
            let tables = category.tables();

            let parts: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", tables.parts))
                .fetch_one(&self.pool)
                .await?;
            let observations: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", tables.prices))
                .fetch_one(&self.pool)
                .await?;

            summaries.push(CategorySummary {
                category,
                parts,
                observations,
            });
        }

        Ok(summaries)
    }
}

fn search_record(category: PartCategory, row: &SqliteRow) -> Result<SearchRecord> {
    Ok(SearchRecord {
        category,
        part_id: row.try_get("part_id")?,
        name: row.try_get("name")?,
        brand: row.try_get("brand")?,
        website: row.try_get("website")?,
        link: row.try_get("link")?,
        price: Price::from_stored(row.try_get::<&str, _>("price")?),
        observed_on: row.try_get("price_date")?,
    })
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
