use crate::model::REQUIRED_HEADER;

const FENCE: &str = "```";

/// Return the body of the first fenced code block, or `text` when there is none.
pub fn extract_code(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text;
    };
    let after = &text[open + FENCE.len()..];
    let body = match after.split_once('\n') {
        Some((tag, rest)) if is_lang_tag(tag.trim()) => rest,
        _ => after,
    };
    match body.find(FENCE) {
        Some(close) => &body[..close],
        None => text,
    }
}

fn is_lang_tag(tag: &str) -> bool {
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderCheck {
    Preserved,
    Altered,
}

impl HeaderCheck {
    /// Compare the leading lines of `content` with the required header.
    /// Leading blank lines and trailing whitespace are ignored.
    pub fn of(content: &str) -> Self {
        let expected: Vec<&str> = REQUIRED_HEADER.lines().map(str::trim_end).collect();
        let actual: Vec<&str> = content
            .lines()
            .skip_while(|l| l.trim().is_empty())
            .map(str::trim_end)
            .take(expected.len())
            .collect();
        if actual == expected {
            HeaderCheck::Preserved
        } else {
            HeaderCheck::Altered
        }
    }
}
