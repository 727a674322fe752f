//! # Cross-Storage Test Suite
//!
//! End-to-end tests running real hubs and clients over the in-memory
//! transport.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Bridge setup shared by the flows below
//!     ├── round_trip.rs    # Storage operations, handshake buffering
//!     ├── permissions.rs   # Origin rules, spoofed traffic
//!     └── delivery.rs      # Concurrent dispatch, duplicated and reordered messages
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xs-tests
//! cargo test -p xs-tests integration::permissions::
//! ```

#![allow(dead_code)]

pub mod integration;
