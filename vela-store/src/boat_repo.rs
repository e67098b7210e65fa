use crate::storage_error;
use async_trait::async_trait;
use sqlx::PgPool;
use vela_core::boat::{Boat, PriceTable};
use vela_core::error::ReservationError;
use vela_core::repository::BoatRepository;

pub struct PgBoatRepository {
    pool: PgPool,
}

impl PgBoatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BoatRow {
    id: String,
    name: String,
    capacity: i32,
    license_required: bool,
    deposit_cents: i64,
    active: bool,
    price_table: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl BoatRow {
    fn into_boat(self) -> Result<Boat, ReservationError> {
        let price_table: PriceTable = serde_json::from_value(self.price_table)
            .map_err(|e| ReservationError::Storage(format!("bad price table JSON: {}", e)))?;
        Ok(Boat {
            id: self.id,
            name: self.name,
            capacity: self.capacity,
            license_required: self.license_required,
            deposit_cents: self.deposit_cents,
            active: self.active,
            price_table,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOAT_COLUMNS: &str = "id, name, capacity, license_required, deposit_cents, active, \
                            price_table, created_at, updated_at";

/// Postgres raises 23505 when an insert collides with the primary key.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[async_trait]
impl BoatRepository for PgBoatRepository {
    async fn get_boat(&self, id: &str) -> Result<Option<Boat>, ReservationError> {
        let row = sqlx::query_as::<_, BoatRow>(&format!(
            "SELECT {} FROM boats WHERE id = $1",
            BOAT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(BoatRow::into_boat).transpose()
    }

    async fn list_active_boats(&self) -> Result<Vec<Boat>, ReservationError> {
        let rows = sqlx::query_as::<_, BoatRow>(&format!(
            "SELECT {} FROM boats WHERE active = TRUE ORDER BY name",
            BOAT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(BoatRow::into_boat).collect()
    }

    async fn create_boat(&self, boat: &Boat) -> Result<(), ReservationError> {
        let price_table = serde_json::to_value(&boat.price_table)
            .map_err(|e| ReservationError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO boats (id, name, capacity, license_required, deposit_cents, active, price_table)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&boat.id)
        .bind(&boat.name)
        .bind(boat.capacity)
        .bind(boat.license_required)
        .bind(boat.deposit_cents)
        .bind(boat.active)
        .bind(price_table)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ReservationError::Validation(format!("boat '{}' already exists", boat.id))
            } else {
                storage_error(err)
            }
        })?;

        Ok(())
    }

    async fn update_boat(&self, boat: &Boat) -> Result<bool, ReservationError> {
        let price_table = serde_json::to_value(&boat.price_table)
            .map_err(|e| ReservationError::Storage(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE boats
            SET name = $2, capacity = $3, license_required = $4, deposit_cents = $5,
                active = $6, price_table = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&boat.id)
        .bind(&boat.name)
        .bind(boat.capacity)
        .bind(boat.license_required)
        .bind(boat.deposit_cents)
        .bind(boat.active)
        .bind(price_table)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
