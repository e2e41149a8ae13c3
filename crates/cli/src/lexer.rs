//! Splits a console line into argument tokens.
//!
//! Whitespace separates tokens and double quotes group them. Backslashes are
//! ordinary characters so Windows paths need no escaping.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
	#[error("unterminated quote starting at column {column}")]
	UnterminatedQuote { column: usize },
}

/// Tokenizes `line`. Quotes are removed; text touching a quoted run joins it
/// (`a"b c"` is the single token `ab c`), and `""` is an empty token.
pub fn tokenize(line: &str) -> Result<Vec<String>, LexError> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut in_token = false;
	let mut quote_start = None;

	for (column, ch) in line.chars().enumerate() {
		match (ch, quote_start) {
			('"', None) => {
				quote_start = Some(column + 1);
				in_token = true;
			}
			('"', Some(_)) => quote_start = None,
			(c, None) if c.is_whitespace() => {
				if in_token {
					tokens.push(std::mem::take(&mut current));
					in_token = false;
				}
			}
			(c, _) => {
				current.push(c);
				in_token = true;
			}
		}
	}

	if let Some(column) = quote_start {
		return Err(LexError::UnterminatedQuote { column });
	}
	if in_token {
		tokens.push(current);
	}
	Ok(tokens)
}
