/// A raw input line split into the part that is clustered and an optional
/// trailing payload that is carried along verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub text: &'a str,
    pub payload: Option<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// Splits once at the first occurrence of `delimiter`.
    pub fn parse(raw: &'a str, delimiter: Option<&str>) -> Self {
        match delimiter.and_then(|d| raw.split_once(d)) {
            Some((text, payload)) => Self { text, payload: Some(payload) },
            None => Self { text: raw, payload: None },
        }
    }
}
