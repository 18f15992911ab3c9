//! HTTP client infrastructure with retry support.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
