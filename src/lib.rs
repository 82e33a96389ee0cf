pub mod auth;
pub mod config;
pub mod drive;
pub mod error;
pub mod logging;
pub mod organizer;
pub mod sheet;

pub use error::{AppError, Result};
