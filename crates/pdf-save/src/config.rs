//! Save configuration
//!
//! Controls the header version and how the cross-reference section is
//! encoded. Loaded from TOML:
//!
//! ```toml
//! version = "1.7"
//!
//! [xref]
//! format = "stream"
//! line-ending = "cr-lf"
//! compression = 9
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use pdf_xref::LineEnding;
use serde::{Deserialize, Serialize};

use crate::error::SaveError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Version written to the `%PDF-x.y` header
    pub version: PdfVersion,
    /// Cross-reference section settings
    pub xref: XrefConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct XrefConfig {
    pub format: XrefFormatKind,
    /// Terminator of classic table records
    pub line_ending: LineEnding,
    /// Flate level for xref streams, 0-9
    pub compression: u32,
}

impl Default for XrefConfig {
    fn default() -> Self {
        Self {
            format: XrefFormatKind::Classic,
            line_ending: LineEnding::SpaceLf,
            compression: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XrefFormatKind {
    /// Plain-text `xref` table followed by a `trailer` dictionary
    #[default]
    Classic,
    /// Compressed cross-reference stream (PDF 1.5+)
    Stream,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PdfVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
    #[serde(rename = "1.2")]
    V1_2,
    #[serde(rename = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    V1_5,
    #[serde(rename = "1.6")]
    V1_6,
    #[default]
    #[serde(rename = "1.7")]
    V1_7,
    #[serde(rename = "2.0")]
    V2_0,
}

impl PdfVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfVersion::V1_0 => "1.0",
            PdfVersion::V1_1 => "1.1",
            PdfVersion::V1_2 => "1.2",
            PdfVersion::V1_3 => "1.3",
            PdfVersion::V1_4 => "1.4",
            PdfVersion::V1_5 => "1.5",
            PdfVersion::V1_6 => "1.6",
            PdfVersion::V1_7 => "1.7",
            PdfVersion::V2_0 => "2.0",
        }
    }

    /// Cross-reference streams were introduced in PDF 1.5
    pub fn supports_xref_streams(&self) -> bool {
        *self >= PdfVersion::V1_5
    }
}

impl SaveConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the settings fail [`validate`](Self::validate).
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read save config: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: SaveConfig = toml::from_str(s).context("Failed to parse save config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.xref.format == XrefFormatKind::Stream && !self.version.supports_xref_streams() {
            return Err(SaveError::InvalidConfig(format!(
                "xref streams need PDF 1.5 or later, header version is {}",
                self.version.as_str()
            )));
        }
        if self.xref.compression > 9 {
            return Err(SaveError::InvalidConfig(format!(
                "compression level {} is outside 0-9",
                self.xref.compression
            )));
        }
        Ok(())
    }
}
