//! Pattern-text parsing.
//!
//! Marker payloads carry patterns as text: a variant name optionally
//! followed by parenthesized bindings, or `_` for a wildcard. Tuple arms are
//! comma-separated lists of such patterns, split at top-level commas only.

/// A pattern parsed from marker text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedPattern {
    /// `_`
    Wildcard,
    /// `Name` or `Name(a, b)`
    Variant { name: String, bindings: Vec<String> },
}

impl ParsedPattern {
    /// The variant name, or `None` for a wildcard.
    pub fn variant_name(&self) -> Option<&str> {
        match self {
            ParsedPattern::Wildcard => None,
            ParsedPattern::Variant { name, .. } => Some(name),
        }
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse one pattern: `_`, `None`, `Ok(v)`, `Pair(a, b)`.
///
/// Returns `None` for malformed text; the caller warns and drops the marker.
pub fn parse_pattern(text: &str) -> Option<ParsedPattern> {
    let text = text.trim();
    if text == "_" {
        return Some(ParsedPattern::Wildcard);
    }

    let (name, rest) = match text.find('(') {
        Some(open) => {
            let close = text.rfind(')')?;
            if close != text.len() - 1 || close < open {
                return None;
            }
            (text[..open].trim(), Some(&text[open + 1..close]))
        }
        None => (text, None),
    };

    if !is_ident(name) {
        return None;
    }

    let bindings = match rest {
        None => Vec::new(),
        Some(inner) if inner.trim().is_empty() => Vec::new(),
        Some(inner) => {
            let mut bindings = Vec::new();
            for part in inner.split(',') {
                let part = part.trim();
                if !is_ident(part) {
                    return None;
                }
                bindings.push(part.to_string());
            }
            bindings
        }
    };

    Some(ParsedPattern::Variant {
        name: name.to_string(),
        bindings,
    })
}

/// Parse a tuple arm: a comma-separated pattern list, split at top-level
/// commas so `Pair(a, b), _` yields two patterns.
pub fn parse_tuple_arm(text: &str) -> Option<Vec<ParsedPattern>> {
    let mut patterns = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                patterns.push(parse_pattern(&text[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    patterns.push(parse_pattern(&text[start..])?);
    Some(patterns)
}

/// Parse a tuple-pattern arity payload.
pub fn parse_arity(text: &str) -> Option<usize> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wildcard() {
        assert_eq!(parse_pattern("_"), Some(ParsedPattern::Wildcard));
        assert_eq!(parse_pattern("  _  "), Some(ParsedPattern::Wildcard));
    }

    #[test]
    fn test_unit_variant() {
        assert_eq!(
            parse_pattern("None"),
            Some(ParsedPattern::Variant {
                name: "None".to_string(),
                bindings: vec![],
            })
        );
    }

    #[test]
    fn test_variant_with_bindings() {
        assert_eq!(
            parse_pattern("Ok(v)"),
            Some(ParsedPattern::Variant {
                name: "Ok".to_string(),
                bindings: vec!["v".to_string()],
            })
        );
        assert_eq!(
            parse_pattern("Pair(a, b)"),
            Some(ParsedPattern::Variant {
                name: "Pair".to_string(),
                bindings: vec!["a".to_string(), "b".to_string()],
            })
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_pattern("Ok("), None);
        assert_eq!(parse_pattern("(v)"), None);
        assert_eq!(parse_pattern("Ok(v) extra"), None);
        assert_eq!(parse_pattern("123"), None);
        assert_eq!(parse_pattern(""), None);
    }

    #[test]
    fn test_tuple_arm_top_level_split() {
        let arm = parse_tuple_arm("Pair(a, b), _");
        assert_eq!(
            arm,
            Some(vec![
                ParsedPattern::Variant {
                    name: "Pair".to_string(),
                    bindings: vec!["a".to_string(), "b".to_string()],
                },
                ParsedPattern::Wildcard,
            ])
        );
    }

    #[test]
    fn test_tuple_arm_unbalanced() {
        assert_eq!(parse_tuple_arm("Ok(v, _"), None);
    }

    #[test]
    fn test_arity() {
        assert_eq!(parse_arity(" 2 "), Some(2));
        assert_eq!(parse_arity("x"), None);
    }
}
