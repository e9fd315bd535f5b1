//! HTTP networking module
//!
//! Provides the client used for every outbound call to the CMS.

mod client;

pub use client::{HttpClient, RawResponse};
