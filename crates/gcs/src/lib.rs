//! cs-gcs: Google Cloud Storage adapter for cloudstash
//!
//! This crate provides the implementation of the ObjectStore trait using
//! the google-cloud-storage crate. Credentials come from application
//! default credentials.

pub mod client;

pub use client::GcsClient;
