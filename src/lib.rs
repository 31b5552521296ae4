//! # Plant Data Library
//!
//! Core functionality for the plant data service: plant operators submit
//! monthly production figures, administrators review, correct, delete and
//! export them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod normalization;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod templates;
pub use migration;
