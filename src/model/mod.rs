pub mod booking;
pub mod user;

pub use booking::LodgeBooking;
pub use user::{DriverProfile, PublicUser, User, UserType};
