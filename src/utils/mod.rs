// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v1.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Reusable helpers with no hardware access.

/// Hex/ASCII dump formatting.
pub mod hexdump;
