pub mod brand;
pub mod oil_change;
pub mod profile;
pub mod service;
pub mod user;
pub mod vehicle;
pub mod vehicle_model;
pub mod vehicle_type;
