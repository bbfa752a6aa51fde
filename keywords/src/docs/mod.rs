//! Documentation for the service as a whole.

pub mod api;
pub mod overview;
pub mod testing;
