//! Meta Lead Relay Library
//!
//! This library provides the core functionality for the lead relay service:
//! a single HTTP endpoint that receives lead-capture form data, hashes
//! personally identifying fields, and forwards one normalized event per
//! request to the Meta Conversions API.
//!
//! # Modules
//!
//! - `capi_client`: Conversions API client.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `hashing`: SHA-256 identifier normalization.
//! - `models`: Inbound lead and outbound event models.

pub mod capi_client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod hashing;
pub mod models;
