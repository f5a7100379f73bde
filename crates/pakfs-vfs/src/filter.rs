//! File-name wildcards and ordering.
//!
//! Listing filters follow the usual file-name wildcard rules: `*` matches any
//! run of characters, `?` matches one, and matching ignores case. The DOS
//! forms `<`, `>` and `"` are accepted as `*`, `?` and `.`. Brackets are
//! literal characters in file names, so they are escaped before the
//! expression is handed to `glob`.

use std::cmp::Ordering;

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Glob(Pattern),
    Nothing,
}

/// A compiled listing filter.
#[derive(Debug, Clone)]
pub struct FileNameFilter {
    expression: String,
    matcher: Matcher,
}

impl FileNameFilter {
    /// Compile a filter expression. A blank expression matches everything.
    pub fn new(expression: &str) -> Self {
        let matcher = if expression.trim().is_empty() {
            Matcher::All
        } else {
            // `to_glob` escapes brackets and collapses star runs, which are
            // the only inputs `Pattern::new` rejects.
            Pattern::new(&to_glob(expression)).map_or(Matcher::Nothing, Matcher::Glob)
        };

        Self {
            expression: expression.to_string(),
            matcher,
        }
    }

    /// A filter that matches every name.
    pub fn match_all() -> Self {
        Self::new("")
    }

    /// The expression this filter was compiled from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether this filter matches every name.
    pub fn is_match_all(&self) -> bool {
        matches!(self.matcher, Matcher::All)
    }

    /// Test a file name against the filter.
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Glob(pattern) => pattern.matches_with(name, MATCH_OPTIONS),
            Matcher::Nothing => false,
        }
    }
}

impl Default for FileNameFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

fn to_glob(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len() + 8);
    let mut previous_star = false;

    for c in expression.chars() {
        let star = matches!(c, '*' | '<');
        // `**` has a special meaning to glob; one star is equivalent here.
        if star && previous_star {
            continue;
        }
        previous_star = star;

        match c {
            '*' | '<' => out.push('*'),
            '?' | '>' => out.push('?'),
            '"' => out.push('.'),
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            other => out.push(other),
        }
    }

    out
}

/// Order file names the way a filesystem listing does.
///
/// Names compare case-insensitively (by upper-cased characters); names that
/// differ only in case fall back to an ordinal comparison so the order is total.
pub fn file_name_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
        .then_with(|| a.cmp(b))
}
