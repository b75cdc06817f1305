//! Keyword routing for a single utterance.
//!
//! Rules are tried top to bottom against the lowercased text; the first rule
//! with any keyword occurring as a substring wins.

/// Which attribute of a job the user asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Link,
    Salary,
    Skills,
    Experience,
    ContractTime,
}

impl DetailKind {
    pub fn label(self) -> &'static str {
        match self {
            DetailKind::Link => "link",
            DetailKind::Salary => "salary",
            DetailKind::Skills => "skills",
            DetailKind::Experience => "experience",
            DetailKind::ContractTime => "contract time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Detail(DetailKind),
    JobSearch,
    SessionEvents,
    Help,
    Faq,
    Unrecognized,
}

struct Rule {
    keywords: &'static [&'static str],
    intent: Intent,
}

const RULES: &[Rule] = &[
    Rule { keywords: &["link"], intent: Intent::Detail(DetailKind::Link) },
    Rule { keywords: &["salary"], intent: Intent::Detail(DetailKind::Salary) },
    Rule { keywords: &["skill"], intent: Intent::Detail(DetailKind::Skills) },
    Rule { keywords: &["experience"], intent: Intent::Detail(DetailKind::Experience) },
    Rule { keywords: &["contract time"], intent: Intent::Detail(DetailKind::ContractTime) },
    Rule { keywords: &["job", "career"], intent: Intent::JobSearch },
    Rule { keywords: &["session", "event"], intent: Intent::SessionEvents },
    Rule { keywords: &["help"], intent: Intent::Help },
    Rule { keywords: &["faq"], intent: Intent::Faq },
];

pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map_or(Intent::Unrecognized, |rule| rule.intent)
}

/// A bare 1-based choice such as `" 2 "`. Anything but ASCII digits after
/// trimming is `None`; values too large for `usize` saturate so they still
/// count as out of range.
pub fn parse_ordinal(message: &str) -> Option<usize> {
    let trimmed = message.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.parse().unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_rules_win() {
        assert_eq!(classify("salary and link please"), Intent::Detail(DetailKind::Link));
        assert_eq!(classify("What SKILLS for this job?"), Intent::Detail(DetailKind::Skills));
        assert_eq!(classify("job events"), Intent::JobSearch);
        assert_eq!(classify("help with faq"), Intent::Help);
        assert_eq!(classify("what is the contract time"), Intent::Detail(DetailKind::ContractTime));
        assert_eq!(classify("hello"), Intent::Unrecognized);
    }

    #[test]
    fn substring_matching_is_literal() {
        // "jobs" contains "job"; "eventually" contains "event"
        assert_eq!(classify("any jobs?"), Intent::JobSearch);
        assert_eq!(classify("eventually"), Intent::SessionEvents);
    }

    #[test]
    fn ordinals() {
        assert_eq!(parse_ordinal(" 2\n"), Some(2));
        assert_eq!(parse_ordinal("0"), Some(0));
        assert_eq!(parse_ordinal("99999999999999999999999999"), Some(usize::MAX));
        assert_eq!(parse_ordinal("-1"), None);
        assert_eq!(parse_ordinal("2nd"), None);
        assert_eq!(parse_ordinal("   "), None);
        assert_eq!(parse_ordinal("٣"), None);
    }
}
