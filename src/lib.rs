//! medportal - medical report upload and analysis client.
//!
//! Validates report images, submits them to an analysis service, and turns
//! the service's loosely-shaped JSON into a stable display model.

pub mod cli;
pub mod config;
pub mod render;
pub mod session;
pub mod storage;
pub mod upload;
pub mod utils;
