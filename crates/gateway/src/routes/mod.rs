// ABOUTME: HTTP route handlers for the gateway.
// ABOUTME: Job listing and pass-through, health probe, and service descriptor.

pub mod health;
pub mod jobs;
pub mod meta;

pub use health::*;
pub use jobs::*;
pub use meta::*;
