//! Message segmentation
//!
//! Splits raw message text into prose, fenced code, block math and inline
//! math. Each step consumes the single earliest delimited region; anything
//! unterminated stays in the surrounding text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Fenced code block: language tag must sit directly against the fence
static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([A-Za-z0-9_]+)?\n((?s:.*?))```").unwrap());

/// Display math, may span lines
static BLOCK_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$((?s:.*?))\$\$").unwrap());

/// Inline math, single line and no nested `$`
static INLINE_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$\n]+?)\$").unwrap());

/// Language used when a fence carries no tag
pub const DEFAULT_CODE_LANGUAGE: &str = "text";

/// A typed, ordered unit of message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentSegment {
    /// Prose, never whitespace-only
    Text { content: String },
    /// Fenced code with its language tag
    Code { content: String, language: String },
    /// `$$...$$`
    BlockMath { content: String },
    /// `$...$`
    InlineMath { content: String },
}

impl ContentSegment {
    pub fn content(&self) -> &str {
        match self {
            ContentSegment::Text { content }
            | ContentSegment::Code { content, .. }
            | ContentSegment::BlockMath { content }
            | ContentSegment::InlineMath { content } => content,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentSegment::Text { .. })
    }
}

/// Delimited region kinds, declared in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RegionKind {
    Code,
    BlockMath,
    InlineMath,
}

/// A delimited region found in the unconsumed input
#[derive(Debug)]
struct Candidate<'a> {
    kind: RegionKind,
    start: usize,
    end: usize,
    captures: Captures<'a>,
}

/// Split raw message content into ordered segments
///
/// Total and deterministic. Whitespace-only text between regions is dropped.
pub fn segment(content: &str) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        let Some(candidate) = earliest_region(rest) else {
            push_text(&mut segments, rest);
            break;
        };

        push_text(&mut segments, &rest[..candidate.start]);
        let end = candidate.end;
        segments.push(region_segment(candidate));
        rest = &rest[end..];
    }

    segments
}

fn earliest_region(text: &str) -> Option<Candidate<'_>> {
    let candidates = [
        (RegionKind::Code, &*CODE_FENCE_REGEX),
        (RegionKind::BlockMath, &*BLOCK_MATH_REGEX),
        (RegionKind::InlineMath, &*INLINE_MATH_REGEX),
    ]
    .into_iter()
    .filter_map(|(kind, regex)| {
        let captures = regex.captures(text)?;
        let whole = captures.get(0)?;
        Some(Candidate {
            kind,
            start: whole.start(),
            end: whole.end(),
            captures,
        })
    });

    pick_earliest(candidates)
}

/// Earliest start wins; ties go to Code, then BlockMath, then InlineMath
fn pick_earliest<'a>(candidates: impl Iterator<Item = Candidate<'a>>) -> Option<Candidate<'a>> {
    candidates.min_by_key(|c| (c.start, c.kind))
}

fn region_segment(candidate: Candidate<'_>) -> ContentSegment {
    let group = |idx: usize| {
        candidate
            .captures
            .get(idx)
            .map(|m| m.as_str())
            .unwrap_or_default()
    };

    match candidate.kind {
        RegionKind::Code => {
            let language = candidate
                .captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string());
            ContentSegment::Code {
                content: group(2).trim().to_string(),
                language,
            }
        }
        RegionKind::BlockMath => ContentSegment::BlockMath {
            content: group(1).trim().to_string(),
        },
        RegionKind::InlineMath => ContentSegment::InlineMath {
            content: group(1).trim().to_string(),
        },
    }
}

fn push_text(segments: &mut Vec<ContentSegment>, text: &str) {
    if !text.trim().is_empty() {
        segments.push(ContentSegment::Text {
            content: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ContentSegment {
        ContentSegment::Text {
            content: s.to_string(),
        }
    }

    fn code(language: &str, s: &str) -> ContentSegment {
        ContentSegment::Code {
            content: s.to_string(),
            language: language.to_string(),
        }
    }

    fn block(s: &str) -> ContentSegment {
        ContentSegment::BlockMath {
            content: s.to_string(),
        }
    }

    fn inline(s: &str) -> ContentSegment {
        ContentSegment::InlineMath {
            content: s.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n\t").is_empty());
    }

    #[test]
    fn test_inline_math_between_text() {
        assert_eq!(
            segment("Hello $x^2$ world"),
            vec![text("Hello "), inline("x^2"), text(" world")]
        );
    }

    #[test]
    fn test_fenced_code_with_language() {
        assert_eq!(
            segment("```python\nprint(1)\n```"),
            vec![code("python", "print(1)")]
        );
    }

    #[test]
    fn test_fenced_code_without_language() {
        assert_eq!(segment("```\nls -la\n```"), vec![code("text", "ls -la")]);
    }

    #[test]
    fn test_block_math_alone() {
        assert_eq!(segment(r"$$\int x\,dx$$"), vec![block(r"\int x\,dx")]);
    }

    #[test]
    fn test_block_math_spans_lines_and_is_trimmed() {
        assert_eq!(
            segment("Sum:\n$$\n a + b \n$$\ndone"),
            vec![text("Sum:\n"), block("a + b"), text("\ndone")]
        );
    }

    #[test]
    fn test_whitespace_between_regions_is_dropped() {
        assert_eq!(
            segment("```a\nx\n``` \n\n```b\ny\n```"),
            vec![code("a", "x"), code("b", "y")]
        );
    }

    #[test]
    fn test_dollar_inside_fence_stays_code() {
        assert_eq!(
            segment("```sh\necho $HOME $PATH\n```"),
            vec![code("sh", "echo $HOME $PATH")]
        );
    }

    #[test]
    fn test_math_before_fence_is_parsed_first() {
        let segments = segment("$$a$$ then\n```js\nlet b = 1;\n```");
        assert_eq!(
            segments,
            vec![block("a"), text(" then\n"), code("js", "let b = 1;")]
        );
    }

    #[test]
    fn test_match_at_offset_zero_is_consumed_first() {
        // A region at the very start must not lose to a later one
        assert_eq!(
            segment("```rs\nfn a() {}\n``` and $y$"),
            vec![code("rs", "fn a() {}"), text(" and "), inline("y")]
        );
    }

    #[test]
    fn test_unterminated_fence_is_text() {
        let input = "Look:\n```rust\nfn main() {}";
        assert_eq!(segment(input), vec![text(input)]);
    }

    #[test]
    fn test_unterminated_math_is_text() {
        assert_eq!(segment("costs $5 today"), vec![text("costs $5 today")]);
        assert_eq!(segment("$$x + y"), vec![text("$$x + y")]);
    }

    #[test]
    fn test_inline_math_does_not_cross_lines() {
        assert_eq!(segment("a $b\nc$ d"), vec![text("a $b\nc$ d")]);
    }

    #[test]
    fn test_fence_tag_must_touch_newline() {
        // A space after the tag means no fence at that position
        let input = "```rust \nfn a() {}\n```";
        let segments = segment(input);
        assert!(segments.iter().all(|s| !matches!(s, ContentSegment::Code { .. })));
    }

    #[test]
    fn test_empty_block_math() {
        assert_eq!(segment("$$$$"), vec![block("")]);
    }

    #[test]
    fn test_tie_break_prefers_code_then_block_then_inline() {
        let haystack = "x";
        let caps = || Regex::new("x").unwrap().captures(haystack).unwrap();
        let make = |kind| Candidate {
            kind,
            start: 4,
            end: 9,
            captures: caps(),
        };

        let picked = pick_earliest(
            vec![
                make(RegionKind::InlineMath),
                make(RegionKind::BlockMath),
                make(RegionKind::Code),
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(picked.kind, RegionKind::Code);

        let picked = pick_earliest(
            vec![make(RegionKind::InlineMath), make(RegionKind::BlockMath)].into_iter(),
        )
        .unwrap();
        assert_eq!(picked.kind, RegionKind::BlockMath);
    }

    #[test]
    fn test_earlier_start_beats_priority() {
        let segments = segment("$a$ ```py\nb\n```");
        assert_eq!(segments[0], inline("a"));
        assert_eq!(segments[1], code("py", "b"));
    }

    #[test]
    fn test_reconstructs_input_when_no_whitespace_runs_dropped() {
        let input = "Intro $a$ mid $$b$$ then ```rs\nc\n``` end";
        let rebuilt: String = segment(input)
            .iter()
            .map(|s| match s {
                ContentSegment::Text { content } => content.clone(),
                ContentSegment::Code { content, language } => {
                    format!("```{}\n{}\n```", language, content)
                }
                ContentSegment::BlockMath { content } => format!("$${}$$", content),
                ContentSegment::InlineMath { content } => format!("${}$", content),
            })
            .collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_string(&inline("x")).unwrap();
        assert_eq!(json, r#"{"type":"inline-math","content":"x"}"#);
    }
}
