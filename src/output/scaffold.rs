//! mdBook scaffolding around generated concept pages.

use chrono::{DateTime, Utc};

use super::writer::OutputFile;

/// A generated concept page, addressed relative to the book's `src/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub title: String,
    pub file_name: String,
}

/// Landing page, table of contents and (if absent) `book.toml`.
pub fn book_scaffold(
    domain: &str,
    src_dir: &str,
    pages: &[BookPage],
    generated_at: DateTime<Utc>,
) -> Vec<OutputFile> {
    let title = if domain.trim().is_empty() {
        "Documentation"
    } else {
        domain.trim()
    };

    let index = format!(
        "# {title}\n\n\
         Generated: {}\n\n\
         Source: `{src_dir}`\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let mut summary = String::from("# Summary\n\n- [Overview](index.md)\n");
    for page in pages {
        summary.push_str(&format!("- [{}]({})\n", page.title, page.file_name));
    }

    let book = format!(
        "[book]\n\
         title = \"{}\"\n\
         src = \"src\"\n\n\
         [output.html]\n",
        title.replace('"', "\\\"")
    );

    vec![
        OutputFile::new("src/index.md", index),
        OutputFile::new("src/SUMMARY.md", summary),
        OutputFile::create_only("book.toml", book),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaffold() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let pages = vec![
            BookPage {
                title: "Invoice".to_string(),
                file_name: "invoice.md".to_string(),
            },
            BookPage {
                title: "Payment retries".to_string(),
                file_name: "payment-retries.md".to_string(),
            },
        ];

        let files = book_scaffold("Billing", "src/", &pages, at);

        assert_eq!(files[0].path, std::path::PathBuf::from("src/index.md"));
        assert_eq!(
            files[0].content,
            "# Billing\n\nGenerated: 2024-05-01 12:30:00 UTC\n\nSource: `src/`\n"
        );
        assert_eq!(
            files[1].content,
            "# Summary\n\n- [Overview](index.md)\n- [Invoice](invoice.md)\n- [Payment retries](payment-retries.md)\n"
        );
        assert!(!files[2].overwrite);
        let book: toml::Table = files[2].content.parse().unwrap();
        assert_eq!(book["book"]["title"].as_str(), Some("Billing"));
    }

    #[test]
    fn test_blank_domain() {
        let files = book_scaffold("  ", "src/", &[], Utc::now());
        assert!(files[0].content.starts_with("# Documentation\n"));
    }
}
