use analytics::Markup;

/// Longest message the Bot API accepts, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Opens and closes a `pre` block when it stands on a line of its own.
const FENCE: &str = "```";

/// Characters with special meaning in Telegram's MarkdownV2, plus the escape character itself.
const SPECIAL_CHARS: &str = r"\_*[]()~`>#+-=|{}.!";

/// Escapes characters that have special meaning in Telegram's MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    escape_with(text, SPECIAL_CHARS)
}

/// Inside `code` and `pre` entities only the backtick and backslash are special.
fn escape_code(text: &str) -> String {
    escape_with(text, r"\`")
}

fn escape_with(text: &str, special: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Splits a MarkdownV2 message on line boundaries into parts of at most `limit`
/// UTF-16 code units.
///
/// A `pre` block that straddles a split is closed at the end of one part and
/// reopened at the start of the next, so every part parses on its own. A single
/// line longer than `limit` still goes out whole.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let fence_len = text_len(FENCE);
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;
    // Lines at the head of `current` that only reopen a block.
    let mut reopened = 0;
    let mut in_pre = false;

    for line in text.split('\n') {
        let line_len = text_len(line);
        let is_fence = line == FENCE;
        // Inside a block (or opening one) there must be room left to close it.
        let reserve = if is_fence != in_pre { 1 + fence_len } else { 0 };
        let separator = usize::from(!current.is_empty());

        if current.len() > reopened && current_len + separator + line_len + reserve > limit {
            if in_pre {
                if current.last() == Some(&FENCE) {
                    // Nothing inside the block yet; open it in the next part instead.
                    current.pop();
                } else {
                    current.push(FENCE);
                }
            }
            if !current.is_empty() {
                parts.push(current.join("\n"));
            }
            current.clear();
            current_len = 0;
            reopened = 0;
            if in_pre {
                current.push(FENCE);
                current_len = fence_len;
                reopened = 1;
            }
        }

        current_len += usize::from(!current.is_empty()) + line_len;
        current.push(line);
        if is_fence {
            in_pre = !in_pre;
        }
    }

    if !current.is_empty() {
        parts.push(current.join("\n"));
    }
    parts
}

/// Telegram MarkdownV2. Dynamic text is escaped before the entity markers are added.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownV2;

impl Markup for MarkdownV2 {
    fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    fn bold(&self, text: &str) -> String {
        format!("*{}*", escape_markdown(text))
    }

    fn code(&self, text: &str) -> String {
        format!("`{}`", escape_code(text))
    }

    fn pre(&self, text: &str) -> String {
        format!("```\n{}\n```", escape_code(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{PnlReport, render_error, render_report};

    fn fences(part: &str) -> usize {
        part.lines().filter(|line| *line == FENCE).count()
    }

    #[test]
    fn escapes_every_reserved_character() {
        assert_eq!(escape_markdown("a_b*c"), r"a\_b\*c");
        assert_eq!(escape_markdown("[x](y)"), r"\[x\]\(y\)");
        assert_eq!(escape_markdown("~`>#+-=|{}.!"), r"\~\`\>\#\+\-\=\|\{\}\.\!");
        assert_eq!(escape_markdown(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(escape_markdown("plain text 123"), "plain text 123");
    }

    #[test]
    fn code_entities_only_escape_backtick_and_backslash() {
        assert_eq!(MarkdownV2.code("6.500000$ (x.y)"), "`6.500000$ (x.y)`");
        assert_eq!(MarkdownV2.code("a`b"), r"`a\`b`");
    }

    #[test]
    fn template_markers_are_not_escaped() {
        let text = render_report(&PnlReport::new(), &MarkdownV2);

        assert!(text.starts_with("✅ *Analysis completed*\n\n"));
        assert!(text.contains("💰 *Total inflow:* `0.000000$`"));
        assert!(text.contains("📅 *PnL by days:*\n```\nDate | PnL with fees | PnL without fees | Total fees\n```"));
        assert!(text.contains("✅ *Best day:* `NA (0.000000$)`"));
        assert!(text.ends_with("🏦 *Total fees:* `0.000000$`"));
        assert!(!text.contains(r"\*"));
        assert!(!text.contains(r"\`"));
    }

    #[test]
    fn skipped_rows_warning_is_escaped_once() {
        let report = PnlReport {
            skipped_rows: 3,
            ..PnlReport::new()
        };
        let text = render_report(&report, &MarkdownV2);
        assert!(text.ends_with("\n⚠️ Skipped malformed rows: 3"));
    }

    #[test]
    fn error_messages_are_escaped_inside_code() {
        assert_eq!(
            render_error("Error analyzing file", "bad `quote`", &MarkdownV2),
            r"❌ *Error analyzing file:* `bad \`quote\``"
        );
    }

    #[test]
    fn short_messages_are_sent_whole() {
        let text = render_report(&PnlReport::new(), &MarkdownV2);
        assert_eq!(split_message(&text, MAX_MESSAGE_LEN), vec![text]);
    }

    #[test]
    fn long_pre_blocks_are_closed_and_reopened() {
        let rows: Vec<String> = (0..20).map(|i| format!("row {i:02}")).collect();
        let text = format!("*title*\n```\n{}\n```\nfooter", rows.join("\n"));

        let parts = split_message(&text, 40);
        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.encode_utf16().count() <= 40, "part too long: {part:?}");
            assert_eq!(fences(part) % 2, 0, "unbalanced block: {part:?}");
        }
        assert!(parts[0].starts_with("*title*\n```\nrow 00"));
        assert!(parts.last().unwrap().ends_with("```\nfooter"));

        let kept: Vec<&str> = parts
            .iter()
            .flat_map(|part| part.lines())
            .filter(|line| line.starts_with("row"))
            .collect();
        assert_eq!(kept, rows);
    }

    #[test]
    fn a_block_is_not_left_empty_at_a_split() {
        let text = format!("{}\n```\nrow\n```", "x".repeat(30));
        let parts = split_message(&text, 38);
        assert_eq!(parts, vec!["x".repeat(30), "```\nrow\n```".to_string()]);
    }
}
