use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One confirmed advance room reservation. Immutable after creation.
///
/// `booking_id` is the externally visible token generated by the client at
/// checkout; it is unique across all bookings. Check-in/check-out stay as
/// calendar strings (`YYYY-MM-DD`) on the wire and in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodgeBooking {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub place_id: String,
    pub lodge_name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub check_in: String,
    pub check_out: String,
    pub room_number: String,
    pub booking_id: String,
    pub advance_amount: f64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}
