//! HTTP access for the artifact cache.

mod client;

pub use client::{HttpClient, HttpClientConfig, DEFAULT_USER_AGENT};
