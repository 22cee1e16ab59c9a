// CLASSIFICATION: COMMUNITY
// Filename: hexdump.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// micboot · Hex Dump Helpers
//
// Formats raw status bytes for a human watching the console:
//
// * [`format_line`]   – one `offset: hex ascii` row.
// * [`render_region`] – separator plus one row per 16 bytes.
//
// Pure functions; callers own the reads.
// ─────────────────────────────────────────────────────────────

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::{self, Write};

/// Bytes shown per row.
pub const BYTES_PER_LINE: usize = 16;

/// Printed before every dump.
pub const SEPARATOR: &str = "------------------------------------------";

/// Character shown for bytes outside the printable ASCII range.
pub const PLACEHOLDER: char = '.';

/// Printable ASCII as the C locale defines it, space through tilde.
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Format one row: `"{offset:04x}:\t{hex}\t{ascii}"`.
///
/// ```
/// use micboot::utils::hexdump::format_line;
/// assert_eq!(format_line(0x10, b"OK\n"), "0010:\t4f4b0a\tOK.");
/// ```
pub fn format_line(offset: usize, chunk: &[u8]) -> String {
    let ascii: String = chunk
        .iter()
        .map(|&b| if is_printable(b) { b as char } else { PLACEHOLDER })
        .collect();
    format!("{:04x}:\t{}\t{}", offset, hex::encode(chunk), ascii)
}

/// Write a separator and the rows covering `bytes` to `out`.
pub fn render_region<W: Write + ?Sized>(bytes: &[u8], out: &mut W) -> io::Result<()> {
    writeln!(out, "{SEPARATOR}")?;
    for (row, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        writeln!(out, "{}", format_line(row * BYTES_PER_LINE, chunk))?;
    }
    Ok(())
}
