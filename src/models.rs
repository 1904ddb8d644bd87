pub mod dashboard;
pub mod inventory;
pub mod operations;
pub mod reporting;
pub mod users;
