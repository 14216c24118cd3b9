//! Citation URL synthesis: the parameterized canonical rule (the primary
//! implementation) and the legacy hard-coded `bills/` builder kept only for
//! documented historical reasons.

use lexrag_core::{pluralize_type, Citation};

const TAIL_LEN: usize = 7;

/// `https://<host>/view/<type-or-pluralized>/<name>/<year-suffix>_<lang-suffix>.pdf`.
///
/// `name`'s last 7 characters are the year+language tail (`_YYYY_C`, a
/// separator, four year digits, a separator, and a single already-reduced
/// language letter); everything before that is the slash-separated document
/// path, with `-` mapped to `/`. The language letter is uppercased whether
/// it arrives as the bare letter or as the first letter of a two-letter ISO
/// code (`en` → `E`, `si` → `S`, `ta` → `T`), so the same routine handles a
/// source that already stores the single-letter convention and one that
/// doesn't.
pub fn canonical_citation_url(host: &str, citation: &Citation) -> Option<String> {
    let stem = &citation.name;
    if stem.chars().count() < TAIL_LEN {
        return None;
    }
    let split_at = stem.char_indices().rev().nth(TAIL_LEN - 1).map(|(i, _)| i)?;
    let path_part = &stem[..split_at];
    let tail = &stem[split_at..];

    let tail_chars: Vec<char> = tail.chars().collect();
    let year: String = tail_chars[1..5].iter().collect();
    let lang_suffix = map_lang_letter(*tail_chars.last()?);

    let path = path_part.replace('-', "/");
    let type_segment = pluralize_type(&citation.type_);

    Some(format!("https://{host}/view/{type_segment}/{path}/{year}_{lang_suffix}.pdf"))
}

fn map_lang_letter(c: char) -> char {
    match c.to_ascii_lowercase() {
        'e' => 'E',
        's' => 'S',
        't' => 'T',
        other => other.to_ascii_uppercase(),
    }
}

/// The legacy builder from `get_relevant_docs.py::get_pdfs`: hardcodes the
/// `bills/` segment and concatenates the year+language tail directly onto
/// the slash-joined path with no separating slash. Kept only as the
/// documented legacy path, not for use in new citations.
pub fn legacy_citation_url(host: &str, name: &str) -> Option<String> {
    if name.chars().count() < TAIL_LEN {
        return None;
    }
    let split_at = name.char_indices().rev().nth(TAIL_LEN - 1).map(|(i, _)| i)?;
    let path_part = &name[..split_at];
    let tail = &name[split_at..];
    let path = path_part.replace('-', "/");
    Some(format!("https://{host}/view/bills/{path}{tail}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_url_matches_the_literal_worked_example() {
        let citation = Citation { type_: "bills".into(), name: "01-2013_2024_E".into() };
        let url = canonical_citation_url("documents.gov.lk", &citation).unwrap();
        assert_eq!(url, "https://documents.gov.lk/view/bills/01/2013/2024_E.pdf");
    }

    #[test]
    fn canonical_url_pluralizes_a_singular_type() {
        let citation = Citation { type_: "constitution".into(), name: "01-2013_2024_E".into() };
        let url = canonical_citation_url("documents.gov.lk", &citation).unwrap();
        assert!(url.contains("/view/constitutions/"));
    }

    #[test]
    fn too_short_name_yields_no_url() {
        let citation = Citation { type_: "bills".into(), name: "short".into() };
        assert!(canonical_citation_url("documents.gov.lk", &citation).is_none());
    }

    #[test]
    fn legacy_url_has_no_separating_slash_before_the_tail() {
        let url = legacy_citation_url("documents.gov.lk", "01-2013_2024_E").unwrap();
        assert_eq!(url, "https://documents.gov.lk/view/bills/01/2013_2024_E.pdf");
    }
}
