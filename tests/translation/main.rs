//! Translation Test Suite
//!
//! End-to-end checks of the key model, the value codec and the GQL
//! translators through the `dutil` facade.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Round Trips** (property-based)
//!   Keys through opaque, literal, wire-proto and JSON forms; values through
//!   JSON and native forms.
//!
//! - **Tier 2: Translation Semantics**
//!   Ancestor extraction, array rewrites, `IS NULL`, key literal parsing.
//!
//! - **Tier 3: Streams**
//!   Format auto-detection and key conversion streams.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test translation
//!
//! # Only the round trips
//! cargo test --test translation round_trip
//! ```

// Test utilities
mod test_utils;

// Tier 1: Round Trips
mod key_round_trips;
mod value_round_trips;

// Tier 2: Translation Semantics
mod filter_translation;
mod key_literals;

// Tier 3: Streams
mod key_streams;
