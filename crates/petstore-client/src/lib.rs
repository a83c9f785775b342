//! Blocking HTTP client for the Petstore pet catalog API.
//!
//! [`PetClient`] speaks the `/pet` resource routes served by `petstore-server`
//! and maps error responses back onto [`ClientError`] variants.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::PetClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("client config error: {0}")]
    Config(String),
}
