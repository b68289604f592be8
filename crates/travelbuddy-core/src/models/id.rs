/// Record ids are integers, but front ends usually hold them as text
/// (form values, command-line arguments). Lookups accept either.
pub trait IntoId {
    fn into_id(self) -> Option<i64>;
}

impl IntoId for i64 {
    fn into_id(self) -> Option<i64> {
        Some(self)
    }
}

impl IntoId for &str {
    fn into_id(self) -> Option<i64> {
        parse_id(self)
    }
}

impl IntoId for &String {
    fn into_id(self) -> Option<i64> {
        parse_id(self)
    }
}

impl IntoId for String {
    fn into_id(self) -> Option<i64> {
        parse_id(&self)
    }
}

/// Parse the leading integer of `input`, ignoring leading whitespace and
/// anything after the digits ("42", " 42", "42abc" all give 42).
pub fn parse_id(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("  42"), Some(42));
        assert_eq!(parse_id("42abc"), Some(42));
        assert_eq!(parse_id("-7"), Some(-7));
        assert_eq!(parse_id("+7"), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("-"), None);
    }

    #[test]
    fn test_into_id() {
        assert_eq!(5_i64.into_id(), Some(5));
        assert_eq!("5".into_id(), Some(5));
        assert_eq!(String::from("17").into_id(), Some(17));
        assert_eq!("x".into_id(), None);
    }
}
