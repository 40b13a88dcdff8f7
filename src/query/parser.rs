//! Query parser
//!
//! Supports:
//! - Free text: `revenue` (substring of family path, ancestor aliases or title)
//! - Quoted phrases: `"year end"` or `'year end'`
//! - Keywords: `#finance` (exact match against item index tokens)
//! - Exclusion: `-draft`, `-#archived`
//!
//! Tokens are lowercased. Parsing never fails: input with unbalanced quotes
//! or a dangling escape is split on whitespace instead.

use serde::Serialize;
use std::collections::BTreeSet;

/// Include/exclude pair of token sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Words {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
}

impl Words {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Parsed query representation.
///
/// Keyword tokens are stored without their leading `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    pub keywords: Words,
    pub freetext: Words,
}

impl Query {
    /// Matches every item
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.freetext.is_empty()
    }
}

/// Parse a query string
pub fn parse_query(input: &str) -> Query {
    let mut query = Query::default();

    for token in quote_aware_split(&input.to_lowercase()) {
        let exclude = token.starts_with('-');
        let token = token.trim_start_matches('-');

        let (group, token) = match token.strip_prefix('#') {
            Some(keyword) => (&mut query.keywords, keyword),
            None => (&mut query.freetext, token),
        };
        if token.is_empty() {
            continue;
        }

        let side = if exclude {
            &mut group.exclude
        } else {
            &mut group.include
        };
        side.insert(token.to_string());
    }

    query
}

/// Split like a POSIX shell: quotes group words and are removed, backslash
/// escapes the next character. Falls back to whitespace splitting when the
/// input is not balanced.
pub fn quote_aware_split(input: &str) -> Vec<String> {
    Splitter::new(input)
        .split()
        .unwrap_or_else(|| input.split_whitespace().map(str::to_string).collect())
}

struct Splitter<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Splitter<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// `None` on an unclosed quote or a trailing backslash
    fn split(&mut self) -> Option<Vec<String>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() {
                return Some(tokens);
            }
            tokens.push(self.parse_word()?);
        }
    }

    fn parse_word(&mut self) -> Option<String> {
        let mut word = String::new();

        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                break;
            }
            self.advance();
            match ch {
                '\'' => self.parse_single_quoted(&mut word)?,
                '"' => self.parse_double_quoted(&mut word)?,
                '\\' => {
                    let escaped = self.peek_char()?;
                    self.advance();
                    word.push(escaped);
                }
                _ => word.push(ch),
            }
        }

        Some(word)
    }

    fn parse_single_quoted(&mut self, word: &mut String) -> Option<()> {
        loop {
            let ch = self.peek_char()?;
            self.advance();
            if ch == '\'' {
                return Some(());
            }
            word.push(ch);
        }
    }

    fn parse_double_quoted(&mut self, word: &mut String) -> Option<()> {
        loop {
            let ch = self.peek_char()?;
            self.advance();
            match ch {
                '"' => return Some(()),
                '\\' => {
                    let next = self.peek_char()?;
                    // Inside double quotes only these are escapable
                    if matches!(next, '"' | '\\') {
                        self.advance();
                        word.push(next);
                    } else {
                        word.push('\\');
                    }
                }
                _ => word.push(ch),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}
