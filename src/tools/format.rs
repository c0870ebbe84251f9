//! Rendering of agent job results.
//!
//! All lengths are counted in Unicode scalar values, never bytes, so a
//! preview can never split a code point.

use std::fmt;

use serde_json::Value;

/// Preview threshold used by `check_job_status`.
pub const RESULT_PREVIEW_CHARS: usize = 3000;

/// Default segment size for [`split_large_content`].
pub const DEFAULT_SEGMENT_CHARS: usize = 4000;

/// How a result value was turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Object carrying a non-empty `raw` string.
    Raw,
    /// Object or array, pretty-printed.
    Json,
    /// Any other scalar.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultText {
    pub kind: ResultKind,
    pub text: String,
}

impl ResultText {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Section label used in status reports.
    pub fn label(&self) -> &'static str {
        match self.kind {
            ResultKind::Json => "Result (JSON)",
            ResultKind::Raw | ResultKind::Text => "Result",
        }
    }

    fn noun(&self) -> &'static str {
        match self.kind {
            ResultKind::Raw => "result",
            ResultKind::Json => "JSON",
            ResultKind::Text => "text",
        }
    }
}

/// Classify a job result and produce its text form.
pub fn result_text(result: &Value) -> ResultText {
    if let Some(raw) = result.get("raw").and_then(Value::as_str)
        && result.is_object()
        && !raw.is_empty()
    {
        return ResultText {
            kind: ResultKind::Raw,
            text: raw.to_string(),
        };
    }

    match result {
        Value::Object(_) | Value::Array(_) => ResultText {
            kind: ResultKind::Json,
            text: serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string()),
        },
        Value::String(s) => ResultText {
            kind: ResultKind::Text,
            text: s.clone(),
        },
        other => ResultText {
            kind: ResultKind::Text,
            text: other.to_string(),
        },
    }
}

/// Literal follow-up call pointing at the untruncated result.
#[derive(Debug, Clone, Copy)]
pub struct FullResultCall<'a> {
    pub agent_identifier: &'a str,
    pub api_base_url: &'a str,
    pub job_id: &'a str,
}

impl fmt::Display for FullResultCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "get_job_full_result(agent_identifier='{}', api_base_url='{}', job_id='{}')",
            self.agent_identifier, self.api_base_url, self.job_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResult {
    pub truncated: bool,
    pub text: String,
}

/// Return the result text unchanged when it fits in `threshold` characters,
/// otherwise a preview followed by a count note and the follow-up call.
pub fn format_result(
    result: &ResultText,
    threshold: usize,
    follow_up: &FullResultCall<'_>,
) -> FormattedResult {
    let total = result.char_len();
    if total <= threshold {
        return FormattedResult {
            truncated: false,
            text: result.text.clone(),
        };
    }

    let preview: String = result.text.chars().take(threshold).collect();
    FormattedResult {
        truncated: true,
        text: format!(
            "Result Preview (truncated - full {} is {} characters):\n\n{}...\n\n\
             To view the complete result, use the get_job_full_result tool:\n{}",
            result.noun(),
            total,
            preview,
            follow_up
        ),
    }
}

/// One segment of [`split_large_content`] output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    pub text: String,
    /// The newline or space consumed at the cut, if any.
    pub separator: Option<char>,
}

impl ContentChunk {
    /// Segment text with its separator reattached.
    pub fn into_text(self) -> String {
        let mut text = self.text;
        if let Some(sep) = self.separator {
            text.push(sep);
        }
        text
    }
}

/// Split `text` into segments of at most `max_size` characters.
///
/// Each cut lands on the last newline in the window, else the last space,
/// else exactly at `max_size`. A break character at the very start of a
/// window is never used. Joining every segment followed by its separator
/// reproduces `text`.
pub fn split_large_content(text: &str, max_size: usize) -> Vec<ContentChunk> {
    let max_size = max_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_size {
        return vec![ContentChunk {
            text: text.to_string(),
            separator: None,
        }];
    }

    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let end = pos + max_size;
        if end >= chars.len() {
            chunks.push(ContentChunk {
                text: chars[pos..].iter().collect(),
                separator: None,
            });
            break;
        }

        let window = &chars[pos..end];
        match last_break(window, '\n').or_else(|| last_break(window, ' ')) {
            Some(offset) => {
                let cut = pos + offset;
                chunks.push(ContentChunk {
                    text: chars[pos..cut].iter().collect(),
                    separator: Some(chars[cut]),
                });
                pos = cut + 1;
            }
            None => {
                chunks.push(ContentChunk {
                    text: window.iter().collect(),
                    separator: None,
                });
                pos = end;
            }
        }
    }
    chunks
}

fn last_break(window: &[char], target: char) -> Option<usize> {
    window.iter().rposition(|&c| c == target).filter(|&i| i > 0)
}

/// Inverse of [`split_large_content`].
pub fn join_chunks(chunks: &[ContentChunk]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&chunk.text);
        if let Some(sep) = chunk.separator {
            out.push(sep);
        }
    }
    out
}
