//! Client for a compliment-generation backend: form state, request
//! lifecycle, email delivery and backend capability checks, plus an
//! interactive shell on top of them.

pub mod api;
pub mod config;
pub mod contract;
pub mod controller;
pub mod error;
pub mod form;
pub mod page;
pub mod shell;

pub use error::{ClientError, Result};
