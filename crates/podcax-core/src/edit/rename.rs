const EDITED_PREFIX: &str = "edited-";
const COUNTED_PREFIX: &str = "edited(";

/// Display name for an audio file after another editor save.
///
/// - `edited(<k>)-<rest>` becomes `edited(<k+1>)-<rest>`
/// - `edited-<rest>` becomes `edited(2)-<rest>`
/// - anything else gets an `edited-` prefix
pub fn edited_name(name: &str) -> String {
    if let Some((count, rest)) = split_counted(name) {
        return format!("edited({})-{}", count.saturating_add(1), rest);
    }
    if let Some(rest) = name.strip_prefix(EDITED_PREFIX) {
        return format!("edited(2)-{}", rest);
    }
    format!("{}{}", EDITED_PREFIX, name)
}

/// `edited(<digits>)-<rest>` into `(count, rest)`.
fn split_counted(name: &str) -> Option<(u64, &str)> {
    let tail = name.strip_prefix(COUNTED_PREFIX)?;
    let close = tail.find(")-")?;
    let digits = &tail[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count = digits.parse().ok()?;
    Some((count, &tail[close + 2..]))
}
