/// Collapses whitespace runs, strips invisible marks and lower-cases, so template
/// phrases match regardless of how the tracker wrapped the text.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_text;

    #[test]
    fn collapses_whitespace_and_case() {
        let source = "\u{feff}As a   User\n\nI  WANT\tthings";
        assert_eq!(normalize_text(source), "as a user i want things");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_text("   \n\t "), "");
    }
}
