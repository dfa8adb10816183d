pub mod alert;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod flow;
pub mod forecast;
pub mod hospital;
pub mod random;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod severity;
pub mod types;
pub mod vitals;
pub mod ward;

pub use error::{Result, TriageError};
