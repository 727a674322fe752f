//! # XS-01 Permission Matcher
//!
//! Decides whether a calling origin may perform a store operation.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure value types
//!   - `OriginPattern`: exact, subdomain-wildcard, or any-origin matcher
//!   - `OperationSet`: allowed operations, or all of them
//!   - `PermissionRule`: one pattern + one operation set
//!
//! - **Service Layer** (`matcher.rs`): `PermissionMatcher` evaluates an
//!   ordered, immutable rule list
//!
//! ## Security
//!
//! - **Default-Deny:** no matching rule means no access
//! - **First-Match-Wins:** rules are evaluated in declaration order
//! - **Transport Identity:** callers pass the origin stamped by the
//!   transport, never one read from a message
//!
//! ## Usage Example
//!
//! ```ignore
//! use xs_01_permission_matcher::{PermissionMatcher, PermissionRule};
//!
//! let matcher = PermissionMatcher::from_json(r#"[
//!     {"origin": "https://*.example.com", "allow": ["get", "set"]},
//!     {"origin": "https://example.com", "allow": ["*"]}
//! ]"#)?;
//!
//! assert!(matcher.is_allowed(&"https://a.example.com".into(), Operation::Get));
//! assert!(!matcher.is_allowed(&"https://a.example.com".into(), Operation::Clear));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;
pub mod matcher;

pub use domain::{OperationSet, OriginPattern, PermissionRule};
pub use error::PatternError;
pub use matcher::PermissionMatcher;
