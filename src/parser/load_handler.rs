//! Document loader: drives the position state machine from markup events.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::container::ContainerReader;
use crate::error::{Error, Result};
use crate::model::Document;

use super::attributes::Attributes;
use super::background::{BackgroundResolver, PdfRepair};
use super::builder::ModelBuilder;
use super::markup::{Attribute, MarkupHandler, MarkupParser};
use super::options::ParseOptions;
use super::position::{ParserPosition, Transition};
use super::warning::{LoadWarning, Warnings};

/// Loads documents and remembers the outcome of the last load.
///
/// A missing background PDF does not fail the load. After a successful
/// load, check [`is_attached_pdf_missing`](Self::is_attached_pdf_missing);
/// if set, either point the handler at a replacement with
/// [`set_pdf_replacement`](Self::set_pdf_replacement) or drop the PDF with
/// [`remove_pdf_background`](Self::remove_pdf_background), then
/// [`reload`](Self::reload).
///
/// # Example
///
/// ```no_run
/// use unxoj::LoadHandler;
///
/// let mut handler = LoadHandler::new();
/// let mut doc = handler.load_document("lecture.xopp")?;
/// if handler.is_attached_pdf_missing() {
///     handler.remove_pdf_background();
///     doc = handler.reload()?;
/// }
/// println!("{} pages", doc.page_count());
/// # Ok::<(), unxoj::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct LoadHandler {
    options: ParseOptions,
    repair: PdfRepair,
    last_path: Option<PathBuf>,
    last_error: Option<String>,
    missing_pdf: Option<PathBuf>,
    warnings: Vec<LoadWarning>,
}

impl LoadHandler {
    /// Create a handler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options used for every load.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Load a document from a file.
    ///
    /// On failure no document is returned and [`last_error`](Self::last_error)
    /// describes the problem.
    pub fn load_document<P: AsRef<Path>>(&mut self, path: P) -> Result<Document> {
        let path = path.as_ref();
        if matches!(&self.last_path, Some(last) if last != path) {
            // Repairs are specific to the document they were requested for.
            self.repair = PdfRepair::None;
        }
        self.last_path = Some(path.to_path_buf());

        let result = ContainerReader::open(path).and_then(|reader| self.parse(reader, Some(path)));
        self.record(result)
    }

    /// Load a document from an already opened container.
    ///
    /// Relative attachment paths cannot be resolved without a document path,
    /// so `attach` references resolve to the bare filename.
    pub fn load_container(&mut self, reader: ContainerReader) -> Result<Document> {
        let path = reader.path().map(Path::to_path_buf);
        let result = self.parse(reader, path.as_deref());
        self.record(result)
    }

    /// Load the last document again, applying any requested PDF repair.
    pub fn reload(&mut self) -> Result<Document> {
        let path = self
            .last_path
            .clone()
            .ok_or_else(|| Error::Other("no document has been loaded".to_string()))?;
        self.load_document(path)
    }

    /// Description of the error that failed the last load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the last load referenced a PDF that does not exist.
    pub fn is_attached_pdf_missing(&self) -> bool {
        self.missing_pdf.is_some()
    }

    /// Path of the PDF the last load expected to find.
    pub fn missing_pdf_filename(&self) -> Option<&Path> {
        self.missing_pdf.as_deref()
    }

    /// Non-fatal conditions from the last load.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Use `path` instead of the PDF declared by the document on the next
    /// load. With `attach`, the PDF is marked as a copy stored with the
    /// document rather than a link.
    pub fn set_pdf_replacement<P: Into<PathBuf>>(&mut self, path: P, attach: bool) {
        self.repair = PdfRepair::Replace {
            path: path.into(),
            attach,
        };
    }

    /// Replace PDF backgrounds with blank paper on the next load.
    pub fn remove_pdf_background(&mut self) {
        self.repair = PdfRepair::Remove;
    }

    fn parse<R: BufRead>(
        &self,
        source: R,
        path: Option<&Path>,
    ) -> Result<(Document, Vec<LoadWarning>)> {
        let mut loader = DocumentLoader::new(&self.options, &self.repair, path);
        MarkupParser::new(source).run(&mut loader)?;
        loader.finish()
    }

    fn record(&mut self, result: Result<(Document, Vec<LoadWarning>)>) -> Result<Document> {
        match result {
            Ok((document, warnings)) => {
                self.last_error = None;
                self.missing_pdf = document
                    .pdf
                    .as_ref()
                    .filter(|pdf| pdf.missing)
                    .map(|pdf| pdf.path.clone());
                self.warnings = warnings;
                Ok(document)
            }
            Err(e) => {
                log::debug!("Load failed: {}", e);
                self.last_error = Some(e.to_string());
                self.missing_pdf = None;
                self.warnings.clear();
                Err(e)
            }
        }
    }
}

/// Metadata and background elements handled without a position change.
#[derive(Debug)]
struct InlineElement {
    tag: &'static str,
    attributes: Vec<Attribute>,
    text: String,
}

/// State of one in-flight load.
struct DocumentLoader<'a> {
    position: ParserPosition,
    builder: ModelBuilder<'a>,
    resolver: BackgroundResolver<'a>,
    inline: Option<InlineElement>,
    warnings: Warnings,
    path: Option<&'a Path>,
}

impl<'a> DocumentLoader<'a> {
    fn new(options: &'a ParseOptions, repair: &'a PdfRepair, path: Option<&'a Path>) -> Self {
        Self {
            position: ParserPosition::NotStarted,
            builder: ModelBuilder::new(options),
            resolver: BackgroundResolver::new(path, repair, options),
            inline: None,
            warnings: Warnings::default(),
            path,
        }
    }

    fn enter(&mut self, next: ParserPosition, attributes: &[Attribute]) -> Result<()> {
        let warnings = &mut self.warnings;
        match next {
            ParserPosition::Started => self
                .builder
                .begin_document(Attributes::new("xournal", attributes)),
            ParserPosition::InPage => self.builder.begin_page(Attributes::new("page", attributes)),
            ParserPosition::InLayer => {
                self.builder
                    .begin_layer(Attributes::new("layer", attributes));
                Ok(())
            }
            ParserPosition::InStroke => self
                .builder
                .begin_stroke(Attributes::new("stroke", attributes), warnings),
            ParserPosition::InText => self
                .builder
                .begin_text(Attributes::new("text", attributes), warnings),
            ParserPosition::InImage => self.builder.begin_image(Attributes::new("image", attributes)),
            ParserPosition::InTexImage => self
                .builder
                .begin_tex_image(Attributes::new("teximage", attributes)),
            ParserPosition::NotStarted | ParserPosition::Finished => {
                Err(Error::Other(format!("cannot enter position {:?}", next)))
            }
        }
    }

    fn open_inline(&mut self, name: &str, attributes: &[Attribute]) {
        let tag = match name {
            "background" => "background",
            "title" => "title",
            _ => "preview",
        };
        self.inline = Some(InlineElement {
            tag,
            attributes: attributes.to_vec(),
            text: String::new(),
        });
    }

    fn close_inline(&mut self, inline: InlineElement) -> Result<()> {
        match inline.tag {
            "background" => {
                let attrs = Attributes::new("background", &inline.attributes);
                let page_index = self.builder.page_index();
                let background =
                    self.resolver
                        .resolve(attrs, &inline.text, page_index, &mut self.warnings)?;
                self.builder.set_background(background)
            }
            "title" => {
                self.builder.set_title(inline.text);
                Ok(())
            }
            // Preview thumbnails are regenerated by the application.
            _ => Ok(()),
        }
    }

    fn finish(self) -> Result<(Document, Vec<LoadWarning>)> {
        if self.position != ParserPosition::Finished {
            return Err(Error::UnexpectedEof(self.position.to_string()));
        }
        let mut document = self.builder.finish()?;
        document.pdf = self.resolver.into_attachment();
        document.filename = self.path.map(Path::to_path_buf);
        Ok((document, self.warnings.into_vec()))
    }
}

impl MarkupHandler for DocumentLoader<'_> {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<()> {
        if let Some(inline) = &self.inline {
            return Err(Error::UnexpectedElement {
                element: name.to_string(),
                position: format!("in <{}>", inline.tag),
            });
        }

        match self.position.on_start(name) {
            Some(Transition::Enter(next)) => {
                self.enter(next, attributes)?;
                log::trace!("{} -> {}", self.position, next);
                self.position = next;
                Ok(())
            }
            Some(Transition::Inline) => {
                self.open_inline(name, attributes);
                Ok(())
            }
            None => Err(Error::UnexpectedElement {
                element: name.to_string(),
                position: self.position.to_string(),
            }),
        }
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        if let Some(inline) = self.inline.take() {
            if inline.tag != name {
                return Err(Error::MismatchedEndTag {
                    expected: inline.tag.to_string(),
                    found: name.to_string(),
                });
            }
            return self.close_inline(inline);
        }

        match (self.position.closing_tag(), self.position.parent()) {
            (Some(expected), Some(parent)) if expected == name => {
                if self.position != ParserPosition::Started {
                    self.builder.close(name, &mut self.warnings)?;
                }
                log::trace!("{} -> {}", self.position, parent);
                self.position = parent;
                Ok(())
            }
            (Some(expected), _) => Err(Error::MismatchedEndTag {
                expected: expected.to_string(),
                found: name.to_string(),
            }),
            (None, _) => Err(Error::UnexpectedElement {
                element: format!("/{}", name),
                position: self.position.to_string(),
            }),
        }
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if let Some(inline) = &mut self.inline {
            inline.text.push_str(text);
        } else if self.position.accepts_text() {
            self.builder.append_text(text);
        }
        Ok(())
    }
}
