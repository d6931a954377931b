//! Output rendering shared by all commands.

use quill_core::Timestamp;
use serde::Serialize;

/// Whether a command prints for humans or machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Print a value as pretty JSON (the `--json` path).
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten an id-like token for human output: `blake3:ab12…` style.
#[must_use]
pub fn short(token: &str, keep: usize) -> String {
    if token.chars().count() <= keep {
        token.to_owned()
    } else {
        let head: String = token.chars().take(keep).collect();
        format!("{head}…")
    }
}

/// Render a Unix-second timestamp as local time.
#[must_use]
pub fn format_ts(ts: Timestamp) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map_or_else(
            || ts.to_string(),
            |utc| {
                utc.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            },
        )
}

/// First line of a content string, truncated for list output.
#[must_use]
pub fn preview(content: &str, keep: usize) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    short(first_line, keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keeps_small_tokens() {
        assert_eq!(short("abc", 8), "abc");
    }

    #[test]
    fn short_truncates_with_ellipsis() {
        assert_eq!(short("blake3:abcdef", 9), "blake3:ab…");
    }

    #[test]
    fn short_respects_char_boundaries() {
        assert_eq!(short("héllo🎉", 2), "hé…");
    }

    #[test]
    fn preview_takes_first_line() {
        assert_eq!(preview("# Title\nbody", 20), "# Title");
    }

    #[test]
    fn format_ts_handles_out_of_range() {
        // i64::MAX seconds is far outside chrono's range; fall back to raw.
        assert_eq!(format_ts(i64::MAX), i64::MAX.to_string());
    }
}
