//! Notification body formatting.
//!
//! Turns raw message text into display lines of styled spans:
//! newlines become line breaks, `**text**` becomes strong and `*text*`
//! becomes emphasis. Pairs are matched non-greedily from left to right,
//! strong first, then emphasis over whatever stars remain (emphasis may
//! therefore wrap or sit inside strong text).

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
}

impl SpanStyle {
    pub const PLAIN: Self = Self {
        strong: false,
        emphasis: false,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    lines: Vec<Line>,
}

impl Body {
    /// Format raw message text. Empty input yields an empty body.
    pub fn format(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        let chars = apply_emphasis(apply_strong(raw));
        Self {
            lines: group_lines(chars),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Body text with markup removed and lines joined by `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

type StyledChar = (char, SpanStyle);

fn apply_strong(raw: &str) -> Vec<StyledChar> {
    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        out.extend(rest[..open].chars().map(|c| (c, SpanStyle::PLAIN)));
        out.extend(after_open[..close].chars().map(|c| {
            (
                c,
                SpanStyle {
                    strong: true,
                    emphasis: false,
                },
            )
        }));
        rest = &after_open[close + 2..];
    }
    out.extend(rest.chars().map(|c| (c, SpanStyle::PLAIN)));
    out
}

fn apply_emphasis(chars: Vec<StyledChar>) -> Vec<StyledChar> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].0 == '*' {
            if let Some(offset) = chars[i + 1..].iter().position(|(c, _)| *c == '*') {
                let close = i + 1 + offset;
                out.extend(chars[i + 1..close].iter().map(|&(c, style)| {
                    (
                        c,
                        SpanStyle {
                            emphasis: true,
                            ..style
                        },
                    )
                }));
                i = close + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn group_lines(chars: Vec<StyledChar>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();
    for (c, style) in chars {
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
            continue;
        }
        match current.spans.last_mut() {
            Some(span) if span.style == style => span.text.push(c),
            _ => current.spans.push(Span {
                text: c.to_string(),
                style,
            }),
        }
    }
    lines.push(current);
    lines
}
