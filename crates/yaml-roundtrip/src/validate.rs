//! Cross-check against a conforming YAML parser.
//!
//! The composer is lenient by construction. Running the source through
//! `saphyr-parser` catches the syntax it lets through silently.

use saphyr_parser::Parser;

use crate::error::{ErrorCode, YamlError};

/// Convert a char index from a saphyr marker to a byte offset in `source`.
fn to_byte(source: &str, char_idx: usize) -> usize {
    source
        .char_indices()
        .nth(char_idx)
        .map_or(source.len(), |(b, _)| b)
}

/// The first scan error in `source`, if any.
pub(crate) fn check(source: &str) -> Option<YamlError> {
    for result in Parser::new_from_str(source) {
        if let Err(err) = result {
            let offset = to_byte(source, err.marker().index());
            tracing::debug!(offset, info = err.info(), "cross-check rejected source");
            return Some(YamlError::new(
                ErrorCode::Syntax,
                offset..offset,
                err.info().to_string(),
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_yaml() {
        assert_eq!(check("# c\na: [1, 2]\nb: |\n  text\n"), None);
    }

    #[test]
    fn reports_unterminated_flow_sequence() {
        let err = check("a: [1, 2\n").expect("scan error");
        assert_eq!(err.code, ErrorCode::Syntax);
        assert!(err.range().start <= "a: [1, 2\n".len());
    }

    #[test]
    fn char_index_maps_to_byte_offset() {
        assert_eq!(to_byte("é: x", 1), 2);
        assert_eq!(to_byte("ab", 10), 2);
    }
}
