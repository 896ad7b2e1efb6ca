//! Lodge booking creation and listing. Bookings are immutable once written;
//! the booking identifier arrives from the client and is unique store-wide.

use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::Json as RespJson,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::LodgeBooking;
use crate::store::{StoreError, BOOKING_LIST_LIMIT};
use crate::AppState;

use super::{clean, require};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub place_id: Option<String>,
    pub lodge_name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub room_number: Option<String>,
    pub booking_id: Option<String>,
    pub advance_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub user_id: Option<String>,
}

pub fn bookings_router() -> Router {
    Router::new()
        .route("/api/lodge-bookings", post(create_booking))
        .route("/api/lodge-bookings", get(list_bookings))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid {} date, expected YYYY-MM-DD", field)))
}

fn parse_owner(value: Option<String>) -> Result<Option<Uuid>, AppError> {
    match clean(value) {
        Some(raw) => Uuid::parse_str(&raw)
            .map(Some)
            .map_err(|_| AppError::validation("Invalid userId")),
        None => Ok(None),
    }
}

pub async fn create_booking(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, RespJson<Value>), AppError> {
    let place_id = require(&payload.place_id, "placeId")?.to_string();
    let lodge_name = require(&payload.lodge_name, "lodgeName")?.to_string();
    let lat = payload
        .lat
        .ok_or_else(|| AppError::validation("lat is required"))?;
    let lng = payload
        .lng
        .ok_or_else(|| AppError::validation("lng is required"))?;
    let check_in = require(&payload.check_in, "checkIn")?.to_string();
    let check_out = require(&payload.check_out, "checkOut")?.to_string();
    let room_number = require(&payload.room_number, "roomNumber")?.to_string();
    let booking_id = require(&payload.booking_id, "bookingId")?.to_string();
    let advance_amount = payload
        .advance_amount
        .ok_or_else(|| AppError::validation("advanceAmount is required"))?;
    let payment_method = require(&payload.payment_method, "paymentMethod")?.to_string();

    // The client validates the date range too, but it is not trusted.
    let check_in_date = parse_date(&check_in, "checkIn")?;
    let check_out_date = parse_date(&check_out, "checkOut")?;
    if check_out_date <= check_in_date {
        return Err(AppError::validation("checkOut must be after checkIn"));
    }

    let user_id = parse_owner(payload.user_id)?;

    let booking = LodgeBooking {
        id: Uuid::new_v4(),
        user_id,
        place_id,
        lodge_name,
        address: clean(payload.address).unwrap_or_default(),
        lat,
        lng,
        check_in,
        check_out,
        room_number,
        booking_id,
        advance_amount,
        payment_method,
        created_at: Utc::now(),
    };

    match state.store.insert_booking(booking).await {
        Ok(booking) => {
            println!("✅ Lodge booking saved: {}", booking.booking_id);
            Ok((
                StatusCode::CREATED,
                RespJson(json!({
                    "success": true,
                    "message": "Lodge booking confirmed",
                    "booking": booking,
                })),
            ))
        }
        Err(StoreError::Duplicate(_)) => Err(AppError::conflict("Booking ID already exists")),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_bookings(
    Extension(state): Extension<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<RespJson<Value>, AppError> {
    let owner = parse_owner(query.user_id)?;
    let bookings = state
        .store
        .list_bookings(owner, BOOKING_LIST_LIMIT)
        .await?;
    Ok(RespJson(json!({ "success": true, "bookings": bookings })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_must_be_calendar_strings() {
        assert!(parse_date("2026-09-01", "checkIn").is_ok());
        assert!(parse_date("01-09-2026", "checkIn").is_err());
        assert!(parse_date("tomorrow", "checkIn").is_err());
    }

    #[test]
    fn owner_filter_accepts_uuid_or_nothing() {
        assert_eq!(parse_owner(None).unwrap(), None);
        assert_eq!(parse_owner(Some("".into())).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_owner(Some(id.to_string())).unwrap(), Some(id));
        assert!(parse_owner(Some("not-a-uuid".into())).is_err());
    }
}
