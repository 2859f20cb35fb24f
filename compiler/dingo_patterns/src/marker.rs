//! Marker comments.
//!
//! The upstream preprocessor tags switch-like constructs with comment
//! markers. Five families are recognized by string prefix:
//!
//! - `DINGO_MATCH_START: <scrutinee>` precedes the construct; the
//!   scrutinee text is preserved verbatim.
//! - `DINGO_PATTERN: <pattern-text>`, one per arm.
//! - `DINGO_GUARD: <condition-text>`, optional, accompanies a guarded arm.
//! - `DINGO_TUPLE_PATTERN: <arity>` precedes a tuple match.
//! - `DINGO_TUPLE_ARM: <pattern-list>`, one per tuple arm.

use dingo_ir::ast::SourceFile;
use dingo_ir::Span;

/// Marker family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    MatchStart,
    Pattern,
    Guard,
    TuplePattern,
    TupleArm,
}

impl MarkerKind {
    /// The marker's comment prefix, including the trailing colon.
    pub fn prefix(self) -> &'static str {
        match self {
            MarkerKind::MatchStart => "DINGO_MATCH_START:",
            MarkerKind::Pattern => "DINGO_PATTERN:",
            MarkerKind::Guard => "DINGO_GUARD:",
            MarkerKind::TuplePattern => "DINGO_TUPLE_PATTERN:",
            MarkerKind::TupleArm => "DINGO_TUPLE_ARM:",
        }
    }
}

/// A recognized marker with its payload text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Text after the prefix, trimmed. Preserved verbatim otherwise.
    pub payload: String,
    pub span: Span,
}

/// All marker kinds, in match priority order.
///
/// `TuplePattern` and `TupleArm` must be tried before `Pattern` would ever
/// be; their prefixes do not overlap, but keeping the order explicit makes
/// the scan deterministic.
const ALL_KINDS: [MarkerKind; 5] = [
    MarkerKind::MatchStart,
    MarkerKind::TuplePattern,
    MarkerKind::TupleArm,
    MarkerKind::Pattern,
    MarkerKind::Guard,
];

/// Scan a file's comments for markers, in source order.
pub fn scan_markers(file: &SourceFile) -> Vec<Marker> {
    let mut markers: Vec<Marker> = file
        .comments
        .iter()
        .filter_map(|comment| {
            let text = strip_comment_syntax(&comment.text);
            ALL_KINDS.iter().find_map(|&kind| {
                text.strip_prefix(kind.prefix()).map(|rest| Marker {
                    kind,
                    payload: rest.trim().to_string(),
                    span: comment.span,
                })
            })
        })
        .collect();
    markers.sort_by_key(|m| m.span.start);
    markers
}

/// Strip `//` / `/* */` comment syntax and surrounding whitespace.
fn strip_comment_syntax(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("//").unwrap_or(text);
    let text = text.strip_prefix("/*").unwrap_or(text);
    let text = text.strip_suffix("*/").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_ir::ast::Comment;
    use pretty_assertions::assert_eq;

    fn file_with_comments(comments: Vec<(&str, u32)>) -> SourceFile {
        SourceFile {
            comments: comments
                .into_iter()
                .map(|(text, pos)| Comment {
                    text: text.to_string(),
                    span: Span::point(pos),
                })
                .collect(),
            ..SourceFile::default()
        }
    }

    #[test]
    fn test_scan_recognizes_families() {
        let file = file_with_comments(vec![
            ("// DINGO_MATCH_START: r", 10),
            ("// DINGO_PATTERN: Ok(v)", 30),
            ("// DINGO_GUARD: v > 0", 35),
            ("// DINGO_TUPLE_PATTERN: 2", 50),
            ("// DINGO_TUPLE_ARM: Ok(x), _", 60),
            ("// just a comment", 70),
        ]);

        let markers = scan_markers(&file);
        assert_eq!(markers.len(), 5);
        assert_eq!(markers[0].kind, MarkerKind::MatchStart);
        assert_eq!(markers[0].payload, "r");
        assert_eq!(markers[1].kind, MarkerKind::Pattern);
        assert_eq!(markers[1].payload, "Ok(v)");
        assert_eq!(markers[2].kind, MarkerKind::Guard);
        assert_eq!(markers[2].payload, "v > 0");
        assert_eq!(markers[3].kind, MarkerKind::TuplePattern);
        assert_eq!(markers[3].payload, "2");
        assert_eq!(markers[4].kind, MarkerKind::TupleArm);
        assert_eq!(markers[4].payload, "Ok(x), _");
    }

    #[test]
    fn test_scan_sorts_by_position() {
        let file = file_with_comments(vec![
            ("// DINGO_PATTERN: Err(e)", 90),
            ("// DINGO_PATTERN: Ok(v)", 20),
        ]);

        let markers = scan_markers(&file);
        assert_eq!(markers[0].payload, "Ok(v)");
        assert_eq!(markers[1].payload, "Err(e)");
    }

    #[test]
    fn test_block_comment_syntax() {
        let file = file_with_comments(vec![("/* DINGO_MATCH_START: status */", 5)]);
        let markers = scan_markers(&file);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].payload, "status");
    }
}
