use urlencoding::encode;

use crate::{config::EncodingMode, errors::SeedError};

/// Encodes a boolean search expression for the `Query=` parameter.
///
/// The four characters every expression uses get fixed spellings
/// (`/` -> `%2f`, `(` -> `%28`, `)` -> `%29`, space -> `+`). Alphanumerics and
/// `-._~` pass through. Anything else is an error in [`EncodingMode::Strict`]
/// and percent-encoded as UTF-8 in [`EncodingMode::Widened`].
pub fn encode_term(term: &str, mode: EncodingMode) -> Result<String, SeedError> {
    let mut encoded = String::with_capacity(term.len() + 16);

    for character in term.chars() {
        match character {
            '/' => encoded.push_str("%2f"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            ' ' => encoded.push('+'),
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~') => {
                encoded.push(c)
            }
            c => match mode {
                EncodingMode::Strict => {
                    return Err(SeedError::UnsupportedCharacter {
                        term: term.to_string(),
                        character: c,
                    });
                }
                EncodingMode::Widened => {
                    let mut buffer = [0u8; 4];
                    encoded.push_str(&encode(c.encode_utf8(&mut buffer)));
                }
            },
        }
    }

    Ok(encoded)
}
