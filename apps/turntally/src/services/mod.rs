pub mod controller;
pub mod setup_store;
pub mod simulate;
