use axum::Router;

pub mod auth;
pub mod bookings;
pub mod status;
pub mod users;

use crate::error::AppError;

pub fn api_router() -> Router {
    Router::new()
        .merge(auth::auth_router())
        .merge(users::users_router())
        .merge(bookings::bookings_router())
        .merge(status::status_router())
}

/// Pulls a required string field out of a request, rejecting missing or
/// blank values with a message naming the field.
pub(crate) fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(format!("{} is required", field))),
    }
}

/// Trims an optional field, dropping it entirely when blank.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_and_blank() {
        assert_eq!(require(&Some("ann".into()), "name").unwrap(), "ann");
        assert_eq!(require(&Some("  ann ".into()), "name").unwrap(), "ann");
        assert!(require(&None, "name").is_err());
        assert!(require(&Some("   ".into()), "name").is_err());
    }

    #[test]
    fn require_error_names_the_field() {
        let err = require(&None, "phone").unwrap_err();
        assert_eq!(err.to_string(), "phone is required");
    }

    #[test]
    fn clean_drops_blank_optionals() {
        assert_eq!(clean(Some(" DL-42 ".into())), Some("DL-42".to_string()));
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
    }
}
