//! Export service: rasterize brochure pages into downloadable files.
//!
//! DESIGN
//! ======
//! Rendering itself belongs to the host (`PageRenderer`). This service renders
//! every page from one view; the caller hides the editing chrome on the engine
//! first and restores it afterwards. A single page is named `brochure.<ext>`.
//! Several pages are named `page-<n>.<ext>` and also packed, uncompressed,
//! into one ZIP archive.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::{Cursor, Write};
use std::str::FromStr;

use brochure_canvas::projection::BrochureView;
use brochure_canvas::store::PageNumber;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ErrorCode, Notification};

/// Archive name used when more than one page is exported.
pub const ARCHIVE_NAME: &str = "brochure-pages.zip";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("no pages to export")]
    NoPages,
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("page {page}: {source}")]
    Render { page: PageNumber, source: RenderError },
    #[error("could not build archive: {0}")]
    Archive(String),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoPages => "E_EXPORT_NO_PAGES",
            Self::UnsupportedFormat(_) => "E_EXPORT_FORMAT",
            Self::Render { .. } => "E_EXPORT_RENDER",
            Self::Archive(_) => "E_EXPORT_ARCHIVE",
        }
    }
}

impl ExportError {
    #[must_use]
    pub fn notification(&self) -> Notification {
        match self {
            Self::NoPages => Notification::destructive("Download failed", "No pages found to download."),
            Self::UnsupportedFormat(format) if format == "pdf" => {
                Notification::info("PDF Download", "PDF generation is not available yet.")
            }
            Self::UnsupportedFormat(_) => Notification::from_error("Download failed", self),
            Self::Render { .. } => Notification {
                code: Some(self.error_code()),
                ..Notification::destructive("Download failed", "Could not generate image. Please try again.")
            },
            Self::Archive(_) => Notification::from_error("Download failed", self),
        }
    }
}

/// Draws one page of a view into image bytes.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_page(
        &self,
        view: &BrochureView,
        page: PageNumber,
        format: ExportFormat,
    ) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub files: Vec<ExportedFile>,
    /// [`ARCHIVE_NAME`] holding every file; only for multi-page exports.
    pub archive: Option<ExportedFile>,
}

impl ExportBundle {
    /// What the host hands to the user: the archive when there is one,
    /// otherwise the single page.
    #[must_use]
    pub fn download(&self) -> Option<&ExportedFile> {
        self.archive.as_ref().or(self.files.first())
    }

    #[must_use]
    pub fn notification(&self) -> Notification {
        let description = if self.archive.is_some() {
            format!("Downloaded {} pages as ZIP file.", self.files.len())
        } else {
            "Downloaded brochure successfully.".to_string()
        };
        Notification::info("Download successful", description)
    }
}

/// File name for `page` of a `page_count`-page export.
#[must_use]
pub fn export_file_name(page: PageNumber, page_count: usize, format: ExportFormat) -> String {
    if page_count > 1 {
        format!("page-{page}.{}", format.extension())
    } else {
        format!("brochure.{}", format.extension())
    }
}

// =============================================================================
// EXPORT
// =============================================================================

/// Render every page of `view`.
///
/// The view should be taken with edit controls hidden.
///
/// # Errors
///
/// `NoPages` when the view has no pages, the first render failure, or an
/// archive that could not be written.
pub async fn render_pages<R>(view: &BrochureView, renderer: &R, format: ExportFormat) -> Result<ExportBundle, ExportError>
where
    R: PageRenderer + ?Sized,
{
    let result = render_all(view, renderer, format).await;
    match &result {
        Ok(bundle) => info!(pages = bundle.files.len(), format = format.extension(), "brochure exported"),
        Err(e) => warn!(error = %e, code = e.error_code(), "brochure export failed"),
    }
    result
}

async fn render_all<R>(view: &BrochureView, renderer: &R, format: ExportFormat) -> Result<ExportBundle, ExportError>
where
    R: PageRenderer + ?Sized,
{
    if view.pages.is_empty() {
        return Err(ExportError::NoPages);
    }

    let page_count = view.pages.len();
    let mut files = Vec::with_capacity(page_count);
    for page_view in &view.pages {
        let page = page_view.page;
        let bytes = renderer
            .render_page(view, page, format)
            .await
            .map_err(|source| ExportError::Render { page, source })?;
        files.push(ExportedFile { name: export_file_name(page, page_count, format), bytes });
    }

    let archive = if page_count > 1 {
        let bytes = build_archive(&files).map_err(|e| ExportError::Archive(e.to_string()))?;
        Some(ExportedFile { name: ARCHIVE_NAME.to_string(), bytes })
    } else {
        None
    };
    Ok(ExportBundle { files, archive })
}

/// Pack `files` into an in-memory ZIP with entries stored uncompressed.
///
/// # Errors
///
/// Any write failure reported by the archive writer.
pub fn build_archive(files: &[ExportedFile]) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for file in files {
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}
