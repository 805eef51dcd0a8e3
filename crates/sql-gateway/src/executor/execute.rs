//! Raw statement execution and the parameter-bound write path

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use super::rows::rows_to_json;
use super::QueryExecutor;

impl QueryExecutor {
    /// Run a raw statement as-is and serialize any returned rows.
    ///
    /// Statements that produce no rows (inserts, DDL) yield an empty vec.
    /// Prepared-statement caching is disabled since the SQL is
    /// client-supplied and rarely repeats.
    pub async fn run_raw(&self, sql: &str) -> Result<Vec<serde_json::Value>> {
        info!(sql, "Executing raw statement");

        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| describe_db_error(sql, e))?;

        Ok(rows_to_json(&rows))
    }

    /// Insert one record with bound parameters, returning the generated id.
    pub async fn insert_record(&self, name: &str, date_of_birth: NaiveDate) -> Result<i32> {
        let sql = insert_sql(&self.table);
        info!(sql = &sql, "Executing INSERT");

        let id: i32 = sqlx::query_scalar(&sql)
            .bind(name)
            .bind(date_of_birth)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| describe_db_error(&sql, e))?;

        Ok(id)
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<()> {
        let sql = create_table_sql(&self.table);
        info!(table = &self.table, "Ensuring table exists");

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create table {}", self.table))?;

        Ok(())
    }
}

fn insert_sql(table: &str) -> String {
    format!(r#"INSERT INTO {table} (name, "dateOfBirth") VALUES ($1, $2) RETURNING id"#)
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            "dateOfBirth" DATE
        )"#
    )
}

/// Flatten a sqlx error into one message carrying the PostgreSQL detail.
fn describe_db_error(sql: &str, e: sqlx::Error) -> anyhow::Error {
    match e.as_database_error() {
        Some(db_err) => anyhow::anyhow!(
            "Statement failed: {sql}: {} (code {:?})",
            db_err.message(),
            db_err.code()
        ),
        None => anyhow::anyhow!("Statement failed: {sql}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_binds_both_columns() {
        assert_eq!(
            insert_sql("patients"),
            r#"INSERT INTO patients (name, "dateOfBirth") VALUES ($1, $2) RETURNING id"#
        );
    }

    #[test]
    fn bootstrap_ddl_quotes_the_camel_case_column() {
        let sql = create_table_sql("patients");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS patients"));
        assert!(sql.contains("id SERIAL PRIMARY KEY"));
        assert!(sql.contains("name VARCHAR(100) NOT NULL"));
        assert!(sql.contains(r#""dateOfBirth" DATE"#));
    }
}
