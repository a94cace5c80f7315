//! SupportPartner Hosted Store
//!
//! This crate provides the client for the hosted backend-as-a-service
//! (a PostgREST endpoint), exposed through the generic `Store` trait.

pub mod client;
pub mod error;
pub mod request;

pub use client::{HostedClient, HostedClientConfig};
pub use error::HostedError;
