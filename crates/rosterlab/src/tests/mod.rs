//! Application tests
//!
//! - `app` - persistence and the matrix lifecycle through [`crate::App`],
//!   using a synchronous stand-in for the resolution worker

mod app;
