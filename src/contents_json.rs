//! Contents.json data model for Apple's Asset Catalog format
//!
//! Mirrors the subset of the asset catalog Contents.json schema needed by a
//! single-size app icon set, and serializes it with the same layout Xcode uses
//! so regenerating the file does not produce a diff once Xcode has touched it.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io;
use std::path::{Path, PathBuf};

/// File name of the descriptor inside every asset catalog folder
pub const CONTENTS_FILE_NAME: &str = "Contents.json";

/// Root structure of a Contents.json file
#[derive(Serialize, Debug, Clone)]
pub struct ContentsFile {
    /// Array of image entries, one per generated file
    pub images: Vec<ImageEntry>,

    /// Versioning and authorship information
    pub info: Info,
}

/// Individual image entry within an asset catalog
///
/// Field order matches the alphabetical order Xcode writes keys in.
#[derive(Serialize, Debug, Clone)]
pub struct ImageEntry {
    /// The filename of the image, relative to the catalog folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// The device type for the image (e.g., "universal", "iphone", "ipad")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idiom: Option<String>,

    /// The platform a universal single-size icon targets (e.g., "ios", "watchos")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// The scale factor for the image (e.g., "2x"); absent for single-size icons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,

    /// The size of the image in points (e.g., "1024x1024")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Versioning and authorship information for the asset catalog
#[derive(Serialize, Debug, Clone)]
pub struct Info {
    /// The application or tool that authored the asset catalog
    pub author: String,

    /// The format version of the asset catalog (always 1)
    pub version: u8,
}

impl ContentsFile {
    /// Creates a new Contents.json structure with the specified author
    pub fn new(author: String) -> Self {
        Self {
            images: Vec::new(),
            info: Info { author, version: 1 },
        }
    }

    /// Adds an image entry to the contents file
    pub fn add_image(&mut self, image: ImageEntry) {
        self.images.push(image);
    }

    /// Serializes the file the way Xcode does: two-space indent, `" : "`
    /// separators and a trailing newline
    pub fn to_xcode_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, XcodeFormatter::new());
        self.serialize(&mut ser)
            .context("Failed to serialize Contents.json")?;
        buf.push(b'\n');

        String::from_utf8(buf).context("Contents.json is not valid UTF-8")
    }
}

impl ImageEntry {
    /// Creates a single-size app icon entry, as used by Xcode 14+ for the
    /// 1024pt universal icon
    ///
    /// # Arguments
    /// * `filename` - The filename for the icon
    /// * `platform` - The target platform (e.g., "ios")
    /// * `size` - The size in points (e.g., "1024x1024")
    pub fn new_single_size_icon(filename: String, platform: String, size: String) -> Self {
        Self {
            filename: Some(filename),
            idiom: Some("universal".to_string()),
            platform: Some(platform),
            scale: None,
            size: Some(size),
        }
    }
}

impl Default for Info {
    /// Creates default Info as written by Xcode itself
    fn default() -> Self {
        Self {
            author: "xcode".to_string(),
            version: 1,
        }
    }
}

/// Writes `contents` as `Contents.json` into `dir`, replacing any existing file
///
/// The directory is not created; a missing directory is reported as an error.
pub fn write_contents_json(dir: &Path, contents: &ContentsFile) -> Result<PathBuf> {
    let json = contents.to_xcode_json()?;
    let contents_path = dir.join(CONTENTS_FILE_NAME);

    std::fs::write(&contents_path, json).with_context(|| {
        format!(
            "Failed to write Contents.json file: {}",
            contents_path.display()
        )
    })?;
    Ok(contents_path)
}

/// `PrettyFormatter` with Xcode's `"key" : value` separator
struct XcodeFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> XcodeFormatter<'a> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl<'a> Formatter for XcodeFormatter<'a> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}
