//! CLI parsing helpers for clap value parsers.

/// Parse a `NAME=VALUE` message argument.
///
/// The name is trimmed and must not be empty; the value is kept verbatim so
/// it can carry spaces.
pub(super) fn parse_message_arg(s: &str) -> Result<(String, String), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("argument '{s}' must use the form NAME=VALUE"));
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(format!("argument '{s}' has an empty name"));
    }
    Ok((trimmed.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::parse_message_arg;
    use rstest::rstest;

    #[rstest]
    #[case("name=Luna", Ok(("name", "Luna")))]
    #[case(" count =3", Ok(("count", "3")))]
    #[case("name=Luna Llena", Ok(("name", "Luna Llena")))]
    #[case("name=", Ok(("name", "")))]
    fn accepts_name_value_pairs(
        #[case] raw: &str,
        #[case] expected: Result<(&str, &str), ()>,
    ) {
        let parsed = parse_message_arg(raw).map_err(|_| ());
        let expected = expected.map(|(n, v)| (n.to_owned(), v.to_owned()));
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("novalue")]
    #[case("=value")]
    fn rejects_malformed_pairs(#[case] raw: &str) {
        assert!(parse_message_arg(raw).is_err());
    }
}
