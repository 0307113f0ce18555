pub mod auth;
pub mod oil_changes;
pub mod profiles;
pub mod services;
pub mod taxonomy;
pub mod users;
pub mod vehicles;
