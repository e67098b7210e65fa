use crate::storage_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use vela_core::error::ReservationError;
use vela_core::repository::{ReservationFilter, ReservationRepository};
use vela_core::reservation::{
    Channel, NewReservation, PaymentStatus, Reservation, ReservationExtra, ReservationPatch,
    ReservationStatus,
};

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    boat_id: String,
    trip_date: chrono::NaiveDate,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    passenger_count: i32,
    subtotal_cents: i64,
    extras_cents: i64,
    deposit_cents: i64,
    total_cents: i64,
    status: String,
    payment_status: String,
    session_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    notes: Option<String>,
    channel: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ExtraRow {
    reservation_id: Uuid,
    name: String,
    unit_price_cents: i64,
    quantity: i32,
}

impl ReservationRow {
    fn into_reservation(self, extras: Vec<ReservationExtra>) -> Result<Reservation, ReservationError> {
        let status = ReservationStatus::parse(&self.status).ok_or_else(|| {
            ReservationError::Storage(format!("unknown reservation status '{}'", self.status))
        })?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            ReservationError::Storage(format!("unknown payment status '{}'", self.payment_status))
        })?;
        let channel = Channel::parse(&self.channel).ok_or_else(|| {
            ReservationError::Storage(format!("unknown channel '{}'", self.channel))
        })?;
        Ok(Reservation {
            id: self.id,
            boat_id: self.boat_id,
            trip_date: self.trip_date,
            start_at: self.start_at,
            end_at: self.end_at,
            passenger_count: self.passenger_count,
            subtotal_cents: self.subtotal_cents,
            extras_cents: self.extras_cents,
            deposit_cents: self.deposit_cents,
            total_cents: self.total_cents,
            status,
            payment_status,
            session_token: self.session_token,
            expires_at: self.expires_at,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            notes: self.notes,
            channel,
            extras,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const RESERVATION_COLUMNS: &str =
    "id, boat_id, trip_date, start_at, end_at, passenger_count, subtotal_cents, extras_cents, \
     deposit_cents, total_cents, status, payment_status, session_token, expires_at, \
     customer_name, customer_email, customer_phone, notes, channel, created_at, updated_at";

/// Postgres raises 23P01 when an insert or update trips the
/// reservations_no_overlap exclusion constraint.
fn is_overlap_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23P01")
    )
}

impl PgReservationRepository {
    async fn load_extras(
        &self,
        reservation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ReservationExtra>>, ReservationError> {
        if reservation_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ExtraRow>(
            "SELECT reservation_id, name, unit_price_cents, quantity \
             FROM reservation_extras WHERE reservation_id = ANY($1) ORDER BY name",
        )
        .bind(reservation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut by_reservation: HashMap<Uuid, Vec<ReservationExtra>> = HashMap::new();
        for row in rows {
            by_reservation
                .entry(row.reservation_id)
                .or_default()
                .push(ReservationExtra {
                    name: row.name,
                    unit_price_cents: row.unit_price_cents,
                    quantity: row.quantity,
                });
        }
        Ok(by_reservation)
    }

    async fn hydrate_one(
        &self,
        row: Option<ReservationRow>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut extras = self.load_extras(&[row.id]).await?;
        let extras = extras.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_reservation(extras)?))
    }

    async fn hydrate_many(
        &self,
        rows: Vec<ReservationRow>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut extras = self.load_extras(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let own = extras.remove(&row.id).unwrap_or_default();
                row.into_reservation(own)
            })
            .collect()
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn insert_hold(&self, new: &NewReservation) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let insert = sqlx::query(
            r#"
            INSERT INTO reservations (
                id, boat_id, trip_date, start_at, end_at, buffered_start, buffered_end,
                passenger_count, subtotal_cents, extras_cents, deposit_cents, total_cents,
                status, payment_status, session_token, expires_at,
                customer_name, customer_email, customer_phone, notes, channel
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    'HOLD', 'UNPAID', $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(new.id)
        .bind(&new.boat_id)
        .bind(new.trip_date)
        .bind(new.start_at)
        .bind(new.end_at)
        .bind(new.buffered_start)
        .bind(new.buffered_end)
        .bind(new.passenger_count)
        .bind(new.subtotal_cents)
        .bind(new.extras_cents)
        .bind(new.deposit_cents)
        .bind(new.total_cents)
        .bind(&new.session_token)
        .bind(new.expires_at)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .bind(&new.notes)
        .bind(new.channel.as_str())
        .execute(&mut *tx)
        .await;

        if let Err(err) = insert {
            drop(tx);
            if is_overlap_violation(&err) {
                // Lost the race (or the window was plain taken): surface
                // the competitors for display.
                let conflicts = self
                    .find_conflicts(&new.boat_id, new.buffered_start, new.buffered_end, None)
                    .await?;
                return Err(ReservationError::Conflict { conflicts });
            }
            return Err(storage_error(err));
        }

        for extra in &new.extras {
            sqlx::query(
                r#"
                INSERT INTO reservation_extras (reservation_id, name, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(new.id)
            .bind(&extra.name)
            .bind(extra.unit_price_cents)
            .bind(extra.quantity)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        self.get(new.id)
            .await?
            .ok_or_else(|| ReservationError::Storage("inserted hold vanished".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_one(row).await
    }

    async fn find_conflicts(
        &self,
        boat_id: &str,
        buffered_start: DateTime<Utc>,
        buffered_end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations \
             WHERE boat_id = $1 \
               AND status IN ('HOLD', 'PENDING_PAYMENT', 'CONFIRMED') \
               AND buffered_start <= $3 AND buffered_end >= $2 \
               AND ($4::uuid IS NULL OR id <> $4) \
             ORDER BY start_at",
            RESERVATION_COLUMNS
        ))
        .bind(boat_id)
        .bind(buffered_start)
        .bind(buffered_end)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_many(rows).await
    }

    async fn advance_to_pending_payment(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations \
             SET status = 'PENDING_PAYMENT', payment_status = 'PENDING', \
                 expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'HOLD' AND expires_at > $2 \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_one(row).await
    }

    async fn confirm(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations \
             SET status = 'CONFIRMED', payment_status = 'PAID', updated_at = NOW() \
             WHERE id = $1 AND status = 'PENDING_PAYMENT' \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_one(row).await
    }

    async fn cancel(
        &self,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations \
             SET status = 'CANCELLED', expires_at = NULL, updated_at = NOW(), \
                 notes = CASE WHEN $2::text IS NULL THEN notes \
                              ELSE concat_ws(E'\\n', notes, 'cancelled: ' || $2) END \
             WHERE id = $1 AND status IN ('HOLD', 'PENDING_PAYMENT', 'CONFIRMED') \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_one(row).await
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        buffered: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let (buffered_start, buffered_end) = match buffered {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };

        let result = sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations \
             SET start_at = COALESCE($2, start_at), \
                 end_at = COALESCE($3, end_at), \
                 trip_date = COALESCE(($2 AT TIME ZONE 'UTC')::date, trip_date), \
                 buffered_start = COALESCE($4, buffered_start), \
                 buffered_end = COALESCE($5, buffered_end), \
                 passenger_count = COALESCE($6, passenger_count), \
                 customer_name = COALESCE($7, customer_name), \
                 customer_email = COALESCE($8, customer_email), \
                 customer_phone = COALESCE($9, customer_phone), \
                 notes = COALESCE($10, notes), \
                 total_cents = COALESCE($11, total_cents), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(patch.start_at)
        .bind(patch.end_at)
        .bind(buffered_start)
        .bind(buffered_end)
        .bind(patch.passenger_count)
        .bind(&patch.customer_name)
        .bind(&patch.customer_email)
        .bind(&patch.customer_phone)
        .bind(&patch.notes)
        .bind(patch.total_cents)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => self.hydrate_one(row).await,
            Err(err) if is_overlap_violation(&err) => {
                // The constraint re-checked the moved window and lost to a
                // concurrent writer.
                let conflicts = match (buffered_start, buffered_end) {
                    (Some(s), Some(e)) => {
                        self.find_conflicts_inner(id, s, e).await?
                    }
                    _ => Vec::new(),
                };
                Err(ReservationError::Conflict { conflicts })
            }
            Err(err) => Err(storage_error(err)),
        }
    }

    async fn expire_stale_holds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, ReservationError> {
        let reaped: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE reservations \
             SET status = 'EXPIRED', updated_at = $1 \
             WHERE status = 'HOLD' AND expires_at < $1 \
             RETURNING id",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(reaped)
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations \
             WHERE ($1::text IS NULL OR boat_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::date IS NULL OR trip_date >= $3) \
               AND ($4::date IS NULL OR trip_date <= $4) \
             ORDER BY start_at",
            RESERVATION_COLUMNS
        ))
        .bind(&filter.boat_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        self.hydrate_many(rows).await
    }
}

impl PgReservationRepository {
    async fn find_conflicts_inner(
        &self,
        exclude: Uuid,
        buffered_start: DateTime<Utc>,
        buffered_end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let boat_id: Option<String> =
            sqlx::query_scalar("SELECT boat_id FROM reservations WHERE id = $1")
                .bind(exclude)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;
        match boat_id {
            Some(boat_id) => {
                self.find_conflicts(&boat_id, buffered_start, buffered_end, Some(exclude))
                    .await
            }
            None => Ok(Vec::new()),
        }
    }
}
