//! Types shared by the GitHub credential and retry crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
