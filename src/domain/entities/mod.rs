pub mod alert;
pub mod property;
