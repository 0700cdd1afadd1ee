//! Live train departure board cache.
//!
//! Polls the National Rail staff departure feed and maintains a
//! low-latency, incrementally-updated view of the next N departures
//! for a slow downstream renderer. The heart of the crate is the
//! [`board::DepartureBoard`]: a versioned, three-tier hydration cache
//! that keeps per-service records identity-stable across snapshots.

pub mod board;
pub mod feed;
pub mod reasons;
pub mod sanitize;
