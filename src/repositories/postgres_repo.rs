use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::error::SqlState;
use bb8_postgres::tokio_postgres::{NoTls, Row};
use tracing::{info, warn};
use crate::models::reservation::Reservation;
use crate::repositories::{ReservationRepository, StoreError, StoreResult};

pub const RETRY_LIMIT: usize = 5;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS reservation (\
    id BIGSERIAL PRIMARY KEY, \
    name TEXT NOT NULL UNIQUE\
);";

pub type PostgresPool = Pool<PostgresConnectionManager<NoTls>>;

pub async fn connect(database_url: &str) -> anyhow::Result<PostgresPool> {
    let manager = PostgresConnectionManager::new_from_stringlike(database_url, NoTls)
        .context("Invalid postgres connection string")?;
    let pool_size = (num_cpus::get() * 2) as u32;
    info!("Creating postgres pool with {} connections", pool_size);
    Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .await
        .context("Failed to build postgres connection pool")
}

pub struct PostgresConnectionRepo {
    postgres_connection: PostgresPool,
}

impl PostgresConnectionRepo {
    pub fn new(
        postgres_connection: PostgresPool,
    ) -> Self {
        Self {
            postgres_connection
        }
    }

    async fn get_postgres_connection(
        &self,
    ) -> anyhow::Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>> {
        for _ in 0..RETRY_LIMIT {
            match self.postgres_connection.get().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!("Failed to retrieve postgres connection due to: {}, retrying in 3s", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                    continue;
                }
            }
        }

        Err(anyhow!("Failed to retrieve a valid connection from postgres pool, BAILING"))
    }

    /// Creates the reservation table with its unique name constraint when missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let conn = self.get_postgres_connection().await?;
        conn.batch_execute(CREATE_TABLE)
            .await
            .context("Failed to create reservation table")
    }

    async fn query_optional(
        &self,
        stmt: &str,
        params: &[&(dyn bb8_postgres::tokio_postgres::types::ToSql + Sync)],
    ) -> StoreResult<Option<Reservation>> {
        let conn = self.get_postgres_connection().await?;
        let row = conn
            .query_opt(stmt, params)
            .await
            .context("Failed to query reservation")?;
        Ok(row.map(parse_row_into_reservation))
    }
}

#[async_trait]
impl ReservationRepository for PostgresConnectionRepo {
    async fn find_all(&self) -> StoreResult<Vec<Reservation>> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query("SELECT id, name FROM reservation ORDER BY id;", &[])
            .await
            .context("Failed to list reservations")?;

        Ok(rows.into_iter().map(parse_row_into_reservation).collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Reservation>> {
        self.query_optional("SELECT id, name FROM reservation WHERE id = $1;", &[&id])
            .await
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Reservation>> {
        self.query_optional("SELECT id, name FROM reservation WHERE name = $1;", &[&name])
            .await
    }

    async fn count(&self) -> StoreResult<u64> {
        let conn = self.get_postgres_connection().await?;
        let row = conn
            .query_one("SELECT COUNT(*) FROM reservation;", &[])
            .await
            .context("Failed to count reservations")?;
        Ok(row.get::<usize, i64>(0) as u64)
    }

    async fn save(&self, record: Reservation) -> StoreResult<Reservation> {
        let conn = self.get_postgres_connection().await?;
        let res = match record.id {
            None => {
                conn.query_one(
                    "INSERT INTO reservation (name) VALUES ($1) \
                     RETURNING id, name, false AS inserted_with_id;",
                    &[&record.name],
                ).await
            }
            Some(id) => {
                conn.query_one(
                    "INSERT INTO reservation (id, name) VALUES ($1, $2) \
                     ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name \
                     RETURNING id, name, (xmax = 0) AS inserted_with_id;",
                    &[&id, &record.name],
                ).await
            }
        };

        match res {
            Ok(row) => {
                if row.get::<&str, bool>("inserted_with_id") {
                    // explicit ids bypass the sequence
                    conn.execute(
                        "SELECT setval(pg_get_serial_sequence('reservation', 'id'), \
                         GREATEST((SELECT MAX(id) FROM reservation), 1));",
                        &[],
                    )
                    .await
                    .context("Failed to advance reservation id sequence")?;
                }
                Ok(parse_row_into_reservation(row))
            }
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateName(record.name))
            }
            Err(e) => {
                warn!("Failed to save reservation {}, due to: {}", record.name, e);
                Err(StoreError::Backend(anyhow!(e).context("Failed to save reservation")))
            }
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<Option<Reservation>> {
        self.query_optional("DELETE FROM reservation WHERE id = $1 RETURNING id, name;", &[&id])
            .await
    }
}

fn parse_row_into_reservation(
    row: Row,
) -> Reservation {
    Reservation {
        id: Some(row.get::<&str, i64>("id")),
        name: row.get("name"),
    }
}
