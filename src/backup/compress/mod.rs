use crate::backup::file_ext::FileExtProvider;
use bon::Builder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Default gzip level, same as `gzip -6`
static DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Gzip settings for the archive stream
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct GzipConfig {
    /// Compression level (0-9), 0 stores without compressing
    #[builder(default = DEFAULT_COMPRESSION_LEVEL)]
    level: u32,
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GzipConfig {
    pub fn build_compressor<W: Write>(&self, writer: W) -> GzEncoder<W> {
        let level = self.level.min(9);
        tracing::debug!("Creating gzip compressor with level={}", level);
        GzEncoder::new(writer, Compression::new(level))
    }
}

impl FileExtProvider for GzipConfig {
    fn file_ext(&self) -> Option<&str> {
        Some("gz")
    }
}
