use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation lifecycle status.
///
/// Transitions are monotonic: Hold -> PendingPayment -> Confirmed, with
/// Cancelled reachable from any non-terminal state (and from Confirmed as a
/// manual override) and Expired reachable only from Hold via the reaper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Hold,
    PendingPayment,
    Confirmed,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Hold => "HOLD",
            ReservationStatus::PendingPayment => "PENDING_PAYMENT",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HOLD" => Some(ReservationStatus::Hold),
            "PENDING_PAYMENT" => Some(ReservationStatus::PendingPayment),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            "EXPIRED" => Some(ReservationStatus::Expired),
            _ => None,
        }
    }

    /// Statuses that occupy capacity and count toward the no-overlap
    /// invariant.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Hold
                | ReservationStatus::PendingPayment
                | ReservationStatus::Confirmed
        )
    }

    /// Legal forward moves in the state machine.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Hold, PendingPayment)
                | (Hold, Cancelled)
                | (Hold, Expired)
                | (PendingPayment, Confirmed)
                | (PendingPayment, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PENDING" => Some(PaymentStatus::Pending),
            "PAID" => Some(PaymentStatus::Paid),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Where the reservation came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Web,
    Admin,
    Messaging,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "WEB",
            Channel::Admin => "ADMIN",
            Channel::Messaging => "MESSAGING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WEB" => Some(Channel::Web),
            "ADMIN" => Some(Channel::Admin),
            "MESSAGING" => Some(Channel::Messaging),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub boat_id: String,
    pub trip_date: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub passenger_count: i32,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub deposit_cents: i64,
    pub total_cents: i64,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    /// Checkout session correlation token, when the reservation was created
    /// from a web checkout.
    pub session_token: Option<String>,
    /// Set only while status is Hold.
    pub expires_at: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub channel: Channel,
    pub extras: Vec<ReservationExtra>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_expired_hold(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Hold
            && self.expires_at.map(|t| t < now).unwrap_or(false)
    }
}

/// A line item owned by its reservation. Name and unit price come from the
/// server-side extras catalog, never from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationExtra {
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl ReservationExtra {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}

/// Fully-priced insert payload for a new hold. Built by the lifecycle
/// manager; totals are already computed server-side.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id: Uuid,
    pub boat_id: String,
    pub trip_date: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Window expanded by the turnaround buffer; what the overlap
    /// constraint actually guards.
    pub buffered_start: DateTime<Utc>,
    pub buffered_end: DateTime<Utc>,
    pub passenger_count: i32,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub deposit_cents: i64,
    pub total_cents: i64,
    pub session_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub channel: Channel,
    pub extras: Vec<ReservationExtra>,
}

/// Admin correction patch. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPatch {
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub passenger_count: Option<i32>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    /// Manual total override for corrections; the regular paths always
    /// compute totals server-side.
    pub total_cents: Option<i64>,
}

impl ReservationPatch {
    pub fn moves_window(&self) -> bool {
        self.start_at.is_some() || self.end_at.is_some()
    }
}
