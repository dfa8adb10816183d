pub mod config;
pub mod hospitals;
pub mod score;
pub mod simulate;
pub mod vitals;
pub mod wards;
