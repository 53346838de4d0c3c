//! Small helpers for fixed-width header text fields.

/// Extract a null-terminated ASCII string from a fixed-width field,
/// trimming surrounding whitespace. Non-ASCII bytes are replaced.
pub fn extract_ascii(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).trim().to_string()
}

/// Extract printable ASCII only, dropping control and high bytes,
/// then trim. Used for fields where stray non-text bytes are expected.
pub fn extract_printable(data: &[u8]) -> String {
    let s: String = data
        .iter()
        .filter(|&&b| (0x20..0x7F).contains(&b))
        .map(|&b| b as char)
        .collect();
    s.trim().to_string()
}
