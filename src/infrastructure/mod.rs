pub mod clock;
pub mod json_store;
pub mod listings;
pub mod sqlite;
