//! Test client for driving the service over real HTTP in integration tests.

mod client;

pub use client::{TestClient, TestRequestBuilder, TestResponse};
