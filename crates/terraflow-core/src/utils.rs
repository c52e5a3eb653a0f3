pub mod launcher;

/// Cut `value` to `max_length` characters, marking the cut with `...`.
///
/// ```
/// use terraflow_core::utils::truncate_text;
///
/// assert_eq!(truncate_text("Firefox", 10), "Firefox");
/// assert_eq!(truncate_text("Terminal: vim", 8), "Terminal...");
/// ```
pub fn truncate_text(value: &str, max_length: u32) -> String {
    let max_length = max_length as usize;

    match value.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_owned(),
    }
}
