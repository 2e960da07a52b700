//! Presentation layer for a stock outperformance prediction service.
//!
//! The service exposes four JSON endpoints; this crate fetches them, renders
//! the results as dashboard HTML and serves that dashboard locally. The same
//! data is available from the command line.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dom;
pub mod logging;
pub mod render;
pub mod web;
