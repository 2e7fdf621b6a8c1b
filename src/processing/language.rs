//! Recognised source languages.
//!
//! The extension table doubles as the allow-list for discovery: a file is in
//! scope only if its extension maps to a language here.

use std::collections::HashMap;
use std::path::Path;

/// Languages whose files are documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    TypeScriptReact,
    JavaScript,
    JavaScriptReact,
    Python,
    Ruby,
    Go,
    Rust,
    Java,
    Kotlin,
    Scala,
    Php,
    CSharp,
    Cpp,
    C,
    Swift,
    Sql,
    Json,
    Yaml,
    Toml,
    Ini,
    Env,
}

impl Language {
    /// Info string used on Markdown code fences.
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::TypeScript => "ts",
            Language::TypeScriptReact => "tsx",
            Language::JavaScript => "js",
            Language::JavaScriptReact => "jsx",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Php => "php",
            Language::CSharp => "csharp",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Swift => "swift",
            Language::Sql => "sql",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Ini => "ini",
            Language::Env => "bash",
        }
    }
}

/// Maps paths to languages by extension.
pub struct LanguageDetector {
    extension_map: HashMap<&'static str, Language>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    /// Create a detector with the default extension table.
    pub fn new() -> Self {
        let mut extension_map = HashMap::new();

        extension_map.insert("ts", Language::TypeScript);
        extension_map.insert("tsx", Language::TypeScriptReact);
        for ext in ["js", "mjs", "cjs"] {
            extension_map.insert(ext, Language::JavaScript);
        }
        extension_map.insert("jsx", Language::JavaScriptReact);
        extension_map.insert("py", Language::Python);
        extension_map.insert("rb", Language::Ruby);
        extension_map.insert("go", Language::Go);
        extension_map.insert("rs", Language::Rust);
        extension_map.insert("java", Language::Java);
        extension_map.insert("kt", Language::Kotlin);
        extension_map.insert("kts", Language::Kotlin);
        extension_map.insert("scala", Language::Scala);
        extension_map.insert("php", Language::Php);
        extension_map.insert("cs", Language::CSharp);
        extension_map.insert("cpp", Language::Cpp);
        extension_map.insert("hpp", Language::Cpp);
        extension_map.insert("c", Language::C);
        extension_map.insert("h", Language::C);
        extension_map.insert("swift", Language::Swift);
        extension_map.insert("sql", Language::Sql);
        extension_map.insert("json", Language::Json);
        extension_map.insert("yml", Language::Yaml);
        extension_map.insert("yaml", Language::Yaml);
        extension_map.insert("toml", Language::Toml);
        extension_map.insert("ini", Language::Ini);
        extension_map.insert("env", Language::Env);

        Self { extension_map }
    }

    /// Detect the language of a path, `None` if the extension is not recognised.
    pub fn detect(&self, path: impl AsRef<Path>) -> Option<Language> {
        let path = path.as_ref();
        // ".env" has no stem, so Path::extension() does not see it
        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Some(Language::Env);
        }
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(ext.as_str()).copied()
    }

    /// Whether the path carries a recognised extension.
    pub fn is_recognized(&self, path: impl AsRef<Path>) -> bool {
        self.detect(path).is_some()
    }

    /// Fence tag for a path, empty when unknown.
    pub fn fence_tag(&self, path: impl AsRef<Path>) -> &'static str {
        self.detect(path).map(|l| l.fence_tag()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        let detector = LanguageDetector::new();

        assert_eq!(detector.detect("src/main.rs"), Some(Language::Rust));
        assert_eq!(detector.detect("app/index.TSX"), Some(Language::TypeScriptReact));
        assert_eq!(detector.detect("lib/util.mjs"), Some(Language::JavaScript));
        assert_eq!(detector.detect("config/.env"), Some(Language::Env));
        assert_eq!(detector.detect("README.md"), None);
        assert_eq!(detector.detect("Makefile"), None);
    }

    #[test]
    fn test_fence_tags() {
        let detector = LanguageDetector::new();

        assert_eq!(detector.fence_tag("a.py"), "python");
        assert_eq!(detector.fence_tag("a.yml"), "yaml");
        assert_eq!(detector.fence_tag("a.env"), "bash");
        assert_eq!(detector.fence_tag("a.png"), "");
    }
}
