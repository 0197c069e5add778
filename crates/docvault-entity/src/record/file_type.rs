//! File type classification.
//!
//! `FileType` is a closed enumeration derived from a file name's extension,
//! never supplied by a user. [`classify`] is the single place the
//! extension → type table lives; the lifecycle manager calls it explicitly
//! at create and replace time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use docvault_core::AppError;

/// The closed set of recognized file categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_type", rename_all = "lowercase")]
pub enum FileType {
    /// PDF documents (`.pdf`).
    #[serde(rename = "PDF")]
    Pdf,
    /// Word documents (`.doc`, `.docx`).
    #[serde(rename = "DOCX")]
    Docx,
    /// Spreadsheets (`.xls`, `.xlsx`).
    #[serde(rename = "XLSX")]
    Xlsx,
    /// Raster images (`.jpg`, `.jpeg`, `.png`, `.gif`, `.bmp`, `.webp`).
    #[serde(rename = "Image")]
    Image,
    /// Everything else.
    #[serde(rename = "Other")]
    Other,
}

impl FileType {
    /// Return the display label for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Xlsx => "XLSX",
            Self::Image => "Image",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "image" => Ok(Self::Image),
            "other" => Ok(Self::Other),
            _ => Err(AppError::validation(format!(
                "Invalid file type: '{s}'. Expected one of: PDF, DOCX, XLSX, Image, Other"
            ))),
        }
    }
}

/// Derive a [`FileType`] from a file name's extension, case-insensitively.
///
/// Names without an extension classify as [`FileType::Other`].
pub fn classify(filename: &str) -> FileType {
    let ext = filename
        .rsplit('.')
        .next()
        .filter(|ext| *ext != filename)
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("pdf") => FileType::Pdf,
        Some("doc") | Some("docx") => FileType::Docx,
        Some("xls") | Some("xlsx") => FileType::Xlsx,
        Some("jpg") | Some("jpeg") | Some("png") | Some("gif") | Some("bmp") | Some("webp") => {
            FileType::Image
        }
        _ => FileType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("report.PDF"), FileType::Pdf);
        assert_eq!(classify("report.pdf"), FileType::Pdf);
        assert_eq!(classify("report.Pdf"), FileType::Pdf);
    }

    #[test]
    fn test_classify_office_formats() {
        assert_eq!(classify("letter.doc"), FileType::Docx);
        assert_eq!(classify("letter.docx"), FileType::Docx);
        assert_eq!(classify("ledger.xls"), FileType::Xlsx);
        assert_eq!(classify("ledger.xlsx"), FileType::Xlsx);
    }

    #[test]
    fn test_classify_images() {
        for name in [
            "scan.jpg", "scan.jpeg", "scan.png", "scan.gif", "scan.bmp", "scan.webp",
        ] {
            assert_eq!(classify(name), FileType::Image, "{name}");
        }
    }

    #[test]
    fn test_classify_unknown_and_missing_extension() {
        assert_eq!(classify("notes.txt"), FileType::Other);
        assert_eq!(classify("archive.tar.gz"), FileType::Other);
        assert_eq!(classify("README"), FileType::Other);
    }

    #[test]
    fn test_from_str_round_trip() {
        for ty in [
            FileType::Pdf,
            FileType::Docx,
            FileType::Xlsx,
            FileType::Image,
            FileType::Other,
        ] {
            assert_eq!(ty.as_str().parse::<FileType>().unwrap(), ty);
        }
        assert!("spreadsheet".parse::<FileType>().is_err());
    }
}
