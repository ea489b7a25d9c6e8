//! File categorization by extension.
//!
//! This module maps a file name's extension to the name of the category folder
//! it belongs in (e.g. `.pdf` → `Documents`). Only the extension string is
//! consulted; file contents are never read.
//!
//! # Examples
//!
//! ```
//! use organizer::file_category::classify;
//!
//! assert_eq!(classify("report.PDF"), "Documents");
//! assert_eq!(classify("holiday.jpeg"), "Images");
//! assert_eq!(classify("Makefile"), "Others");
//! ```

use std::collections::HashMap;
use std::path::Path;

/// A built-in file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Office documents and plain text (PDF, DOCX, TXT, MD, etc.)
    Documents,
    /// Raster and vector images (JPG, PNG, SVG, etc.)
    Images,
    /// Audio files (MP3, WAV, FLAC, M4A)
    Audio,
    /// Video files (MP4, MOV, MKV, AVI)
    Videos,
    /// Archives and compressed files (ZIP, RAR, 7Z, TAR, GZ)
    Archives,
    /// Installers and packages (EXE, MSI, DMG, PKG)
    Installers,
    /// Source code and structured data (PY, JS, JSON, YAML, etc.)
    Code,
    /// Catch-all for unknown extensions and files without one
    Others,
}

impl Category {
    /// Every built-in category, in table order.
    pub const ALL: [Category; 8] = [
        Category::Documents,
        Category::Images,
        Category::Audio,
        Category::Videos,
        Category::Archives,
        Category::Installers,
        Category::Code,
        Category::Others,
    ];

    /// Returns the folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use organizer::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Documents => "Documents",
            Category::Images => "Images",
            Category::Audio => "Audio",
            Category::Videos => "Videos",
            Category::Archives => "Archives",
            Category::Installers => "Installers",
            Category::Code => "Code",
            Category::Others => "Others",
        }
    }

    /// Lowercase extensions (with leading dot) that belong to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Documents => &[".pdf", ".docx", ".xlsx", ".pptx", ".txt", ".md"],
            Category::Images => &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"],
            Category::Audio => &[".mp3", ".wav", ".flac", ".m4a"],
            Category::Videos => &[".mp4", ".mov", ".mkv", ".avi"],
            Category::Archives => &[".zip", ".rar", ".7z", ".tar", ".gz"],
            Category::Installers => &[".exe", ".msi", ".dmg", ".pkg"],
            Category::Code => &[
                ".py", ".js", ".ts", ".html", ".css", ".json", ".yaml", ".yml", ".xml",
            ],
            Category::Others => &[],
        }
    }

    /// Looks up the category of a lowercase, dot-prefixed extension.
    ///
    /// Returns `Category::Others` when the extension is not in the table.
    pub fn from_extension(ext: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|category| category.extensions().iter().any(|known| *known == ext))
            .unwrap_or(Category::Others)
    }

    /// Categorizes a file name using the built-in table.
    pub fn from_file_name(file_name: &str) -> Category {
        match extension_of(file_name) {
            Some(ext) => Category::from_extension(&ext),
            None => Category::Others,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Extracts the lowercase extension of a file name, including the leading dot.
///
/// Names without a dot and dot-only names such as `.gitignore` have no
/// extension. Only the text after the final dot counts, so `archive.tar.gz`
/// yields `.gz`.
///
/// # Examples
///
/// ```
/// use organizer::file_category::extension_of;
///
/// assert_eq!(extension_of("photo.JPG").as_deref(), Some(".jpg"));
/// assert_eq!(extension_of("archive.tar.gz").as_deref(), Some(".gz"));
/// assert_eq!(extension_of(".gitignore"), None);
/// assert_eq!(extension_of("README"), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Classifies a file name with the built-in extension table.
///
/// Never fails: unknown extensions and files without an extension resolve to
/// `"Others"`.
pub fn classify(file_name: &str) -> &'static str {
    Category::from_file_name(file_name).dir_name()
}

/// Maps extensions to category folder names.
///
/// Starts out as the built-in table and can be extended with custom
/// categories from the configuration file. Keys are unique: adding a mapping
/// for an extension that is already present replaces it.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    extension_map: HashMap<String, String>,
}

impl ExtensionTable {
    /// Creates a table holding the built-in mappings.
    pub fn new() -> Self {
        let extension_map = Category::ALL
            .into_iter()
            .flat_map(|category| {
                category
                    .extensions()
                    .iter()
                    .map(move |ext| (ext.to_string(), category.dir_name().to_string()))
            })
            .collect();
        Self { extension_map }
    }

    /// Adds (or replaces) an extension mapping.
    ///
    /// The extension is lowercased and given a leading dot if it lacks one, so
    /// `"EPUB"`, `"epub"` and `".epub"` all register the same key.
    pub fn add_mapping(&mut self, ext: &str, category: &str) {
        self.extension_map
            .insert(normalize_extension(ext), category.to_string());
    }

    /// Builder-style variant of [`ExtensionTable::add_mapping`].
    pub fn with_mapping(mut self, ext: &str, category: &str) -> Self {
        self.add_mapping(ext, category);
        self
    }

    /// Returns the category for an extension, if the table has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use organizer::file_category::ExtensionTable;
    ///
    /// let table = ExtensionTable::default();
    /// assert_eq!(table.category_for_extension(".PNG"), Some("Images"));
    /// assert_eq!(table.category_for_extension("png"), Some("Images"));
    /// assert_eq!(table.category_for_extension(".xyz"), None);
    /// ```
    pub fn category_for_extension(&self, ext: &str) -> Option<&str> {
        self.extension_map
            .get(&normalize_extension(ext))
            .map(String::as_str)
    }

    /// Classifies a file name against this table, falling back to `"Others"`.
    pub fn classify(&self, file_name: &str) -> &str {
        extension_of(file_name)
            .and_then(|ext| self.extension_map.get(&ext))
            .map(String::as_str)
            .unwrap_or_else(|| Category::Others.dir_name())
    }

    /// Number of extensions in the table.
    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    /// Returns true if the table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases an extension and makes sure it starts with a single dot.
pub(crate) fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim().trim_start_matches('.').to_lowercase())
}
