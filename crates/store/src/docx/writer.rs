//! DOCX package writer
//!
//! Rebuilds a package entry by entry: merged content parts are written fresh,
//! everything else is copied through untouched.

use crate::docx::error::DocxResult;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes the entries of an output package
pub struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> PackageWriter<W> {
    /// Create a new package writer
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Write an XML part to the ZIP archive
    pub fn write_file(&mut self, path: &str, content: &str) -> DocxResult<()> {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        self.zip.start_file(path, options)?;
        self.zip.write_all(content.as_bytes())?;

        Ok(())
    }

    pub(crate) fn zip_mut(&mut self) -> &mut ZipWriter<W> {
        &mut self.zip
    }

    /// Finish the ZIP archive and hand back the sink
    pub fn finish(self) -> DocxResult<W> {
        Ok(self.zip.finish()?)
    }
}
