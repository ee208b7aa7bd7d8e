//! Page background classification and attachment resolution.
//!
//! A `pdf` background names its file only on the first page that uses it;
//! the path is resolved and checked once per load. A PDF that cannot be
//! found is not an error: it is recorded on the attachment so the caller
//! can offer a replacement and reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Background, BackgroundStyle, Color, PdfAttachment, PixmapSource};

use super::attributes::Attributes;
use super::options::{ExtractMode, ParseOptions};
use super::payload::decode_base64;
use super::warning::{LoadWarning, Warnings};

/// Caller-requested repair applied to `pdf` backgrounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PdfRepair {
    /// Use the path declared in the document.
    #[default]
    None,
    /// Use another file; `attach` marks it as a copy stored with the document.
    Replace { path: PathBuf, attach: bool },
    /// Turn every PDF background into blank paper.
    Remove,
}

/// Per-load resolver state.
#[derive(Debug)]
pub(crate) struct BackgroundResolver<'a> {
    document_path: Option<&'a Path>,
    repair: &'a PdfRepair,
    options: &'a ParseOptions,
    pdf: Option<PdfAttachment>,
}

impl<'a> BackgroundResolver<'a> {
    pub fn new(
        document_path: Option<&'a Path>,
        repair: &'a PdfRepair,
        options: &'a ParseOptions,
    ) -> Self {
        Self {
            document_path,
            repair,
            options,
            pdf: None,
        }
    }

    /// The PDF resolved so far, consumed at the end of the load.
    pub fn into_attachment(self) -> Option<PdfAttachment> {
        self.pdf
    }

    /// Build the background for page `page_index` from a `<background>` tag
    /// and its accumulated character data.
    pub fn resolve(
        &mut self,
        attrs: Attributes<'_>,
        inline: &str,
        page_index: usize,
        warnings: &mut Warnings,
    ) -> Result<Background> {
        let kind = attrs.required("type")?;
        match kind {
            "solid" => self.solid(attrs, warnings),
            "pixmap" => self.pixmap(attrs, inline, page_index, warnings),
            "pdf" => self.pdf(attrs, warnings),
            other => Err(attrs.invalid("type", other)),
        }
    }

    fn solid(&self, attrs: Attributes<'_>, warnings: &mut Warnings) -> Result<Background> {
        let raw_color = attrs.required("color")?;
        let color = Color::parse_background(raw_color).unwrap_or_else(|| {
            warnings.push(LoadWarning::UnknownColor {
                element: "background",
                value: raw_color.to_string(),
            });
            Color::WHITE
        });

        let style = match attrs.optional("style") {
            None => BackgroundStyle::Plain,
            Some(raw) => BackgroundStyle::parse(raw).unwrap_or_else(|| {
                warnings.push(LoadWarning::UnknownBackgroundStyle {
                    value: raw.to_string(),
                });
                BackgroundStyle::Plain
            }),
        };

        Ok(Background::Solid { color, style })
    }

    fn pixmap(
        &self,
        attrs: Attributes<'_>,
        inline: &str,
        page_index: usize,
        warnings: &mut Warnings,
    ) -> Result<Background> {
        if !inline.trim().is_empty() {
            let data = match self.options.extract_mode {
                ExtractMode::Full => decode_base64("background", inline)?,
                ExtractMode::StructureOnly => Vec::new(),
            };
            return Ok(Background::Pixmap(PixmapSource::Inline { data }));
        }

        let domain = attrs.required("domain")?;
        let filename = attrs.required("filename")?;
        let source = match domain {
            "absolute" => PixmapSource::File {
                path: PathBuf::from(filename),
                attached: false,
            },
            "attach" => PixmapSource::File {
                path: self.attached_path(filename),
                attached: true,
            },
            "clone" => {
                let page: usize = attrs.required_int("filename")?;
                if page >= page_index {
                    return Err(attrs.invalid("filename", filename));
                }
                PixmapSource::Clone { page }
            }
            other => return Err(attrs.invalid("domain", other)),
        };

        if let PixmapSource::File { path, .. } = &source {
            if self.options.check_attachments && !path.exists() {
                warnings.push(LoadWarning::MissingPixmap { path: path.clone() });
            }
        }

        Ok(Background::Pixmap(source))
    }

    fn pdf(&mut self, attrs: Attributes<'_>, warnings: &mut Warnings) -> Result<Background> {
        let pageno: usize = attrs.required_int("pageno")?;
        if pageno == 0 {
            return Err(attrs.invalid("pageno", "0"));
        }

        if *self.repair == PdfRepair::Remove {
            return Ok(Background::blank());
        }

        if self.pdf.is_none() {
            let mut attachment = match self.repair {
                PdfRepair::Replace { path, attach } => PdfAttachment::new(path.clone(), *attach),
                _ => self.declared_pdf(attrs)?,
            };

            if self.options.check_attachments && !attachment.path.exists() {
                attachment.missing = true;
                warnings.push(LoadWarning::MissingPdf {
                    path: attachment.path.clone(),
                });
            }
            log::debug!(
                "Background PDF {} (attached: {}, missing: {})",
                attachment.path.display(),
                attachment.attached,
                attachment.missing
            );
            self.pdf = Some(attachment);
        }

        Ok(Background::Pdf {
            page_number: pageno - 1,
        })
    }

    fn declared_pdf(&self, attrs: Attributes<'_>) -> Result<PdfAttachment> {
        let domain = attrs.required("domain")?;
        let filename = attrs.required("filename")?;
        match domain {
            "absolute" => Ok(PdfAttachment::new(self.linked_path(filename), false)),
            "attach" => Ok(PdfAttachment::new(self.attached_path(filename), true)),
            other => Err(attrs.invalid("domain", other)),
        }
    }

    /// A linked file that moved together with the document is looked up
    /// next to it under the same name.
    fn linked_path(&self, filename: &str) -> PathBuf {
        let declared = PathBuf::from(filename);
        if declared.exists() {
            return declared;
        }
        let sibling = self
            .document_path
            .and_then(Path::parent)
            .zip(declared.file_name())
            .map(|(dir, name)| dir.join(name));
        match sibling {
            Some(candidate) if candidate.exists() => candidate,
            _ => declared,
        }
    }

    /// Attached files are stored as `<document>.<filename>`.
    fn attached_path(&self, filename: &str) -> PathBuf {
        match self.document_path {
            Some(doc) => {
                let mut path = OsString::from(doc.as_os_str());
                path.push(".");
                path.push(filename);
                PathBuf::from(path)
            }
            None => PathBuf::from(filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::markup::Attribute;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
        pairs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_solid_defaults() {
        let options = ParseOptions::default();
        let repair = PdfRepair::None;
        let mut resolver = BackgroundResolver::new(None, &repair, &options);
        let mut warnings = Warnings::default();

        let list = attrs(&[("type", "solid"), ("color", "yellow")]);
        let bg = resolver
            .resolve(Attributes::new("background", &list), "", 0, &mut warnings)
            .unwrap();
        assert_eq!(
            bg,
            Background::Solid {
                color: Color::from_rgb_u32(0xffff80),
                style: BackgroundStyle::Plain
            }
        );
        assert!(warnings.into_vec().is_empty());
    }

    #[test]
    fn test_unknown_type() {
        let options = ParseOptions::default();
        let repair = PdfRepair::None;
        let mut resolver = BackgroundResolver::new(None, &repair, &options);
        let list = attrs(&[("type", "hologram")]);
        let err = resolver
            .resolve(Attributes::new("background", &list), "", 0, &mut Warnings::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { attribute: "type", .. }));
    }

    #[test]
    fn test_attached_path() {
        let options = ParseOptions::default();
        let repair = PdfRepair::None;
        let doc = Path::new("/notes/lecture.xopp");
        let resolver = BackgroundResolver::new(Some(doc), &repair, &options);
        assert_eq!(
            resolver.attached_path("bg.pdf"),
            PathBuf::from("/notes/lecture.xopp.bg.pdf")
        );
    }

    #[test]
    fn test_clone_must_reference_earlier_page() {
        let options = ParseOptions::default();
        let repair = PdfRepair::None;
        let mut resolver = BackgroundResolver::new(None, &repair, &options);
        let list = attrs(&[("type", "pixmap"), ("domain", "clone"), ("filename", "0")]);

        let bg = resolver
            .resolve(Attributes::new("background", &list), "", 2, &mut Warnings::default())
            .unwrap();
        assert_eq!(bg, Background::Pixmap(PixmapSource::Clone { page: 0 }));

        assert!(resolver
            .resolve(Attributes::new("background", &list), "", 0, &mut Warnings::default())
            .is_err());
    }

    #[test]
    fn test_pdf_filename_only_needed_once() {
        let options = ParseOptions::default().with_attachment_check(false);
        let repair = PdfRepair::None;
        let mut resolver = BackgroundResolver::new(None, &repair, &options);
        let mut warnings = Warnings::default();

        let first = attrs(&[
            ("type", "pdf"),
            ("domain", "absolute"),
            ("filename", "/papers/a.pdf"),
            ("pageno", "1"),
        ]);
        let second = attrs(&[("type", "pdf"), ("pageno", "2")]);

        let bg1 = resolver
            .resolve(Attributes::new("background", &first), "", 0, &mut warnings)
            .unwrap();
        let bg2 = resolver
            .resolve(Attributes::new("background", &second), "", 1, &mut warnings)
            .unwrap();
        assert_eq!(bg1, Background::Pdf { page_number: 0 });
        assert_eq!(bg2, Background::Pdf { page_number: 1 });

        let pdf = resolver.into_attachment().unwrap();
        assert_eq!(pdf.path, PathBuf::from("/papers/a.pdf"));
        assert!(!pdf.attached);
        assert!(!pdf.missing);
    }

    #[test]
    fn test_remove_pdf_background() {
        let options = ParseOptions::default();
        let repair = PdfRepair::Remove;
        let mut resolver = BackgroundResolver::new(None, &repair, &options);
        let list = attrs(&[("type", "pdf"), ("pageno", "3")]);
        let bg = resolver
            .resolve(Attributes::new("background", &list), "", 0, &mut Warnings::default())
            .unwrap();
        assert_eq!(bg, Background::blank());
        assert!(resolver.into_attachment().is_none());
    }
}
