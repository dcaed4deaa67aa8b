//! Resource and output address extraction from textual plan lines.
//!
//! Every block header in `terraform show` output starts with a four character
//! marker (`  # `, `  + `, `  - ` or `  ~ `) followed by the address. Addresses
//! may carry quoted index keys with arbitrary content, e.g.
//! `aws_vpc.this["some string"].out["bar/baz"]`, so a plain whitespace split
//! is not enough.

/// Length of the marker that precedes an address.
pub const MARKER_LEN: usize = 4;

/// Scanner position relative to quoted index keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Quoted,
}

/// Returns the address embedded in a block header line.
///
/// Examples:
/// - `  # aws_vpc.this[0] will be created` -> `aws_vpc.this[0]`
/// - `  # aws_vpc.this["some string"].out["bar/baz"]: ...` -> `aws_vpc.this["some string"].out["bar/baz"]`
/// - `  + some_output = "test"` -> `some_output`
///
/// Lines shorter than the marker yield an empty address.
#[must_use]
pub fn extract_address(line: &str) -> &str {
    let Some(rest) = line.get(MARKER_LEN..) else {
        return "";
    };

    let mut state = QuoteState::Unquoted;
    for (i, ch) in rest.char_indices() {
        state = match (state, ch) {
            (QuoteState::Unquoted, '"') => QuoteState::Quoted,
            (QuoteState::Quoted, '"') => QuoteState::Unquoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::Unquoted, c) if is_address_char(c) => QuoteState::Unquoted,
            (QuoteState::Unquoted, _) => return &rest[..i],
        };
    }

    rest
}

/// Characters allowed in an unquoted part of a Terraform address.
///
/// Digits are decimal only; `½` and similar numerals end the address.
fn is_address_char(ch: char) -> bool {
    ch.is_alphabetic() || ch.is_ascii_digit() || matches!(ch, '.' | '[' | ']' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_resource() {
        assert_eq!(
            extract_address("  # aws_vpc.this[0] will be created"),
            "aws_vpc.this[0]"
        );
    }

    #[test]
    fn test_quoted_keys_with_special_characters() {
        assert_eq!(
            extract_address(r#"  # aws_vpc.this["some string"].out["bar/baz"]: has changed"#),
            r#"aws_vpc.this["some string"].out["bar/baz"]"#
        );
        assert_eq!(
            extract_address(r#"  # aws_vpc.this["a/b"].out[0] will be created"#),
            r#"aws_vpc.this["a/b"].out[0]"#
        );
    }

    #[test]
    fn test_output_line() {
        assert_eq!(extract_address(r#"  + some_output = "test""#), "some_output");
        assert_eq!(extract_address("  ~ changed-output = {"), "changed-output");
    }

    #[test]
    fn test_module_path() {
        assert_eq!(
            extract_address("  # module.network.aws_subnet.private[2] must be replaced"),
            "module.network.aws_subnet.private[2]"
        );
    }

    #[test]
    fn test_address_at_end_of_line() {
        assert_eq!(extract_address("  - removed_output"), "removed_output");
    }

    #[test]
    fn test_unclosed_quote_takes_rest_of_line() {
        assert_eq!(
            extract_address(r#"  # aws_vpc.this["broken key will be created"#),
            r#"aws_vpc.this["broken key will be created"#
        );
    }

    #[test]
    fn test_no_valid_characters() {
        assert_eq!(extract_address("  #  leading space"), "");
    }

    #[test]
    fn test_non_decimal_numerals_end_address() {
        assert_eq!(extract_address("  + ratio½ = 1"), "ratio");
        assert_eq!(extract_address("  + café_2 = 1"), "café_2");
    }

    #[test]
    fn test_short_line() {
        assert_eq!(extract_address("  #"), "");
        assert_eq!(extract_address(""), "");
    }
}
