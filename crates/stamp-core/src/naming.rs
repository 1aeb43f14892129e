//! Download names for stamped documents

use url::Url;

const FALLBACK_NAME: &str = "document.pdf";

/// `<basename>-edited.pdf`, where basename is the last segment of the source
/// URL's path with a trailing `.pdf` (any case) removed.
pub fn output_filename(source: &Url) -> String {
    let last = source
        .path()
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_NAME);

    format!("{}-edited.pdf", strip_pdf_extension(last))
}

fn strip_pdf_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name_for(url: &str) -> String {
        output_filename(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_strips_pdf_extension() {
        assert_eq!(name_for("https://example.com/files/report.pdf"), "report-edited.pdf");
    }

    #[test]
    fn test_extension_match_ignores_case() {
        assert_eq!(name_for("https://example.com/Report.PDF"), "Report-edited.pdf");
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(
            name_for("https://example.com/a/invoice.pdf?token=abc#page=2"),
            "invoice-edited.pdf"
        );
    }

    #[test]
    fn test_non_pdf_name_kept_whole() {
        assert_eq!(name_for("https://example.com/download/file.bin"), "file.bin-edited.pdf");
    }

    #[test]
    fn test_trailing_slash_uses_fallback() {
        assert_eq!(name_for("https://example.com/docs/"), "document-edited.pdf");
        assert_eq!(name_for("https://example.com"), "document-edited.pdf");
    }

    #[test]
    fn test_only_final_extension_is_stripped() {
        assert_eq!(name_for("https://example.com/a.pdf.pdf"), "a.pdf-edited.pdf");
    }

    #[test]
    fn test_percent_encoding_is_kept() {
        assert_eq!(name_for("https://example.com/my%20file.pdf"), "my%20file-edited.pdf");
    }

    #[test]
    fn test_short_names() {
        assert_eq!(strip_pdf_extension(".pdf"), "");
        assert_eq!(strip_pdf_extension("pdf"), "pdf");
        assert_eq!(strip_pdf_extension(""), "");
    }
}
