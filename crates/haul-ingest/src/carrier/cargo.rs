//! Parser for the `cargo_carried` list literal
//!
//! Extracts write the cargo classes as a bracketed list of quoted strings:
//!
//! ```text
//! ['General Freight', 'Household Goods']
//! ["Liquids/Gases"]
//! []
//! ```
//!
//! Grammar accepted here, and nothing else:
//!
//! ```text
//! list   := ws '[' ws ( string ( ws ',' ws string )* ( ws ',' )? )? ws ']' ws
//! string := '\'' chars '\'' | '"' chars '"'
//! ```
//!
//! Inside a string a backslash escapes `\\`, `\'`, `\"`, `\n`, `\t` and `\r`.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::CoercionError;

/// Parse a cargo list literal into its items
pub fn parse_cargo_list(input: &str) -> Result<Vec<String>, CoercionError> {
    ListParser::new(input).parse()
}

struct ListParser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> ListParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<String>, CoercionError> {
        let mut items = Vec::new();

        self.skip_whitespace();
        self.expect('[')?;
        self.skip_whitespace();

        if !self.eat(']') {
            loop {
                items.push(self.string()?);
                self.skip_whitespace();

                if self.eat(']') {
                    break;
                }
                self.expect(',')?;
                self.skip_whitespace();
                if self.eat(']') {
                    break;
                }
            }
        }

        self.skip_whitespace();
        if let Some(&(offset, c)) = self.chars.peek() {
            return Err(self.error(offset, format!("unexpected '{}' after closing bracket", c)));
        }

        Ok(items)
    }

    fn string(&mut self) -> Result<String, CoercionError> {
        let quote = match self.chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            Some((offset, c)) => {
                return Err(self.error(offset, format!("expected quoted string, found '{}'", c)))
            },
            None => return Err(self.error(self.input.len(), "unterminated list")),
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(value),
                Some((offset, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                    Some((_, c)) => {
                        return Err(self.error(offset, format!("unsupported escape '\\{}'", c)))
                    },
                    None => return Err(self.error(offset, "dangling escape")),
                },
                Some((_, c)) => value.push(c),
                None => return Err(self.error(self.input.len(), "unterminated string")),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn expect(&mut self, expected: char) -> Result<(), CoercionError> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((offset, c)) => Err(self.error(offset, format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(self.input.len(), format!("expected '{}', found end of input", expected))),
        }
    }

    fn error(&self, offset: usize, reason: impl Into<String>) -> CoercionError {
        CoercionError::CargoLiteral {
            value: self.input.to_string(),
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quoted_items() {
        assert_eq!(
            parse_cargo_list("['General Freight', 'Household Goods']").unwrap(),
            vec!["General Freight", "Household Goods"]
        );
    }

    #[test]
    fn test_mixed_quotes_and_escapes() {
        assert_eq!(
            parse_cargo_list(r#"["Liquids/Gases", 'Driver\'s Choice', "a\"b"]"#).unwrap(),
            vec!["Liquids/Gases", "Driver's Choice", "a\"b"]
        );
    }

    #[test]
    fn test_empty_and_trailing_comma() {
        assert!(parse_cargo_list("[]").unwrap().is_empty());
        assert!(parse_cargo_list("  [ ]  ").unwrap().is_empty());
        assert_eq!(parse_cargo_list("['A',]").unwrap(), vec!["A"]);
    }

    #[test]
    fn test_brackets_inside_strings_are_text() {
        assert_eq!(parse_cargo_list("['[x]']").unwrap(), vec!["[x]"]);
    }

    #[test]
    fn test_rejects_non_list_input() {
        for input in ["", "General Freight", "['A'", "['A' 'B']", "[A]", "['A']x", "['A',,]"] {
            assert!(
                matches!(parse_cargo_list(input), Err(CoercionError::CargoLiteral { .. })),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_error_reports_offset() {
        match parse_cargo_list("['A'; 'B']").unwrap_err() {
            CoercionError::CargoLiteral { offset, value, .. } => {
                assert_eq!(offset, 4);
                assert_eq!(value, "['A'; 'B']");
            },
            other => panic!("unexpected error {:?}", other),
        }
    }
}
