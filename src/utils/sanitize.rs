//! Utilities for making error messages safe to log.
//!
//! Fetch errors can embed response fragments; these helpers strip control
//! characters and cap the length before a message reaches the log.

/// Removes control characters (0x00-0x1F except newline, tab and carriage
/// return) from a message.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes a message and truncates it to `MAX_ERROR_MESSAGE_LENGTH` characters.
///
/// Truncated messages end with a marker carrying the original length.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let char_count = sanitized.chars().count();

    if char_count > crate::config::MAX_ERROR_MESSAGE_LENGTH {
        // Leave room for the truncation marker
        let keep = crate::config::MAX_ERROR_MESSAGE_LENGTH.saturating_sub(50);
        let head: String = sanitized.chars().take(keep).collect();
        format!(
            "{}... (truncated, original length: {} chars)",
            head, char_count
        )
    } else {
        sanitized
    }
}
