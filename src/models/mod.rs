pub mod booking;
pub mod review;
pub mod show;
pub mod tag;
pub mod theatre;
pub mod user;
