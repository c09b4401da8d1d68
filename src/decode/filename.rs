//! Output filename derivation

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILENAME_CHARS: usize = 200;

/// Extensions kept as-is; anything else gets `.pdf` appended
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf", "txt", "csv", "xml", "png",
    "jpg", "jpeg", "tif", "tiff",
];

/// Name used when the API supplies nothing usable
pub fn default_filename(id: &str) -> String {
    format!("{}.pdf", sanitize_component(id))
}

/// Remove characters that are illegal in file names on common platforms
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Turn an API-provided name (possibly a full path) into a safe file name
///
/// Returns `None` when nothing usable is left.
pub fn sanitize(raw: &str) -> Option<String> {
    let last = raw
        .rsplit(['/', '\\'])
        .find(|part| !part.trim().is_empty())
        .unwrap_or("");

    let cleaned = sanitize_component(last);
    let cleaned = cleaned.trim_matches('.').trim();
    if cleaned.is_empty() {
        return None;
    }

    Some(truncate(cleaned))
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= MAX_FILENAME_CHARS {
        return name.to_string();
    }

    let (stem, ext) = split_extension(name);
    let ext_len = ext.map(|e| e.chars().count() + 1).unwrap_or(0);
    let keep = MAX_FILENAME_CHARS.saturating_sub(ext_len).max(1);
    let stem: String = stem.chars().take(keep).collect();

    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

pub fn has_document_extension(name: &str) -> bool {
    split_extension(name)
        .1
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Append `.pdf` unless a recognised document extension is present
pub fn ensure_extension(name: String) -> String {
    if has_document_extension(&name) {
        name
    } else {
        format!("{name}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_untouched() {
        assert_eq!(sanitize("doc.pdf").as_deref(), Some("doc.pdf"));
        assert_eq!(
            sanitize("Signed Agreement - v2.docx").as_deref(),
            Some("Signed Agreement - v2.docx")
        );
    }

    #[test]
    fn test_strips_illegal_characters() {
        assert_eq!(sanitize("re: what?*.pdf").as_deref(), Some("re what.pdf"));
        assert_eq!(sanitize("a<b>c|d\".pdf").as_deref(), Some("abcd.pdf"));
        assert_eq!(sanitize("tab\tname.pdf").as_deref(), Some("tabname.pdf"));
    }

    #[test]
    fn test_takes_last_path_component() {
        assert_eq!(
            sanitize("C:\\Users\\x\\contract.pdf").as_deref(),
            Some("contract.pdf")
        );
        assert_eq!(sanitize("/srv/files/scan.tif").as_deref(), Some("scan.tif"));
        assert_eq!(sanitize("folder/").as_deref(), Some("folder"));
    }

    #[test]
    fn test_unusable_names() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("   "), None);
        assert_eq!(sanitize("."), None);
        assert_eq!(sanitize(".."), None);
        assert_eq!(sanitize("???"), None);
    }

    #[test]
    fn test_truncates_long_names_keeping_extension() {
        let long = format!("{}.pdf", "a".repeat(300));
        let name = sanitize(&long).unwrap();
        assert_eq!(name.chars().count(), MAX_FILENAME_CHARS);
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension("doc.pdf".into()), "doc.pdf");
        assert_eq!(ensure_extension("DOC.PDF".into()), "DOC.PDF");
        assert_eq!(ensure_extension("report.docx".into()), "report.docx");
        assert_eq!(ensure_extension("invoice".into()), "invoice.pdf");
        assert_eq!(ensure_extension("v1.2 final".into()), "v1.2 final.pdf");
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(default_filename("123"), "123.pdf");
        assert_eq!(default_filename("a/b"), "ab.pdf");
    }
}
