/// Pluralize a collection `type` for use in a URL path segment, per the
/// `<type-or-pluralized>` convention shared by the legacy `retrieve_doc`
/// filenames and citation URL synthesis: already-plural tags (`acts`,
/// `bills`, `gazettes`) pass through unchanged; singular tags
/// (`constitution`) gain a trailing `s`.
pub fn pluralize_type(type_: &str) -> String {
    if type_.ends_with('s') {
        type_.to_string()
    } else {
        format!("{type_}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_plural_types_pass_through() {
        assert_eq!(pluralize_type("bills"), "bills");
        assert_eq!(pluralize_type("acts"), "acts");
        assert_eq!(pluralize_type("gazettes"), "gazettes");
    }

    #[test]
    fn singular_type_gains_trailing_s() {
        assert_eq!(pluralize_type("constitution"), "constitutions");
    }
}
