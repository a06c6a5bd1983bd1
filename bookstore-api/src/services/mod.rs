//! Domain services

pub mod order;

pub use order::place_order;
