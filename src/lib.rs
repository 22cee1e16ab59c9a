// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v1.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Boots a MIC coprocessor card and follows its progress through GDDR.
//!
//! The host maps part of the card's memory from `/dev/mem`, asks the MIC
//! driver to boot a custom image, then watches well-known offsets that the
//! card's bootloader writes to.

/// Boot trigger, doorbells, status monitor and the sequence tying them.
pub mod boot;

/// CLI interface for the micboot binary.
pub mod cli;

/// Addresses, cookies and paths.
pub mod config;

/// Physical memory windows.
pub mod hal;

/// Utilities and common helpers used across modules
pub mod utils;
