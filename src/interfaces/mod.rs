//! Output adapters.

pub mod csv;
