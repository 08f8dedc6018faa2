//! Test helpers para restkit-server.

#![allow(dead_code, unused_imports)]

pub mod client;

pub use client::{TestClient, TestResponse, app_client, app_client_with, client};
