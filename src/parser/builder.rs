//! Model builder: an owning stack of in-progress objects.
//!
//! Entering a page, layer or element pushes a frame; the matching end tag
//! pops it, finishes it and moves it into the frame below (or into the
//! document for pages). Nothing is ever referenced across levels.

use crate::error::{Error, Result};
use crate::model::{
    Background, Color, Document, Element, Image, Layer, Page, Point, Rect, Stroke, StrokeTool,
    TexImage, Text,
};

use super::attributes::Attributes;
use super::options::{ErrorMode, ExtractMode, ParseOptions};
use super::payload::decode_base64;
use super::warning::{LoadWarning, Warnings};

/// First format version in which `teximage` always carries its source.
const TEXIMAGE_TEXT_REQUIRED_SINCE: u32 = 2;

#[derive(Debug)]
struct PendingPage {
    page: Page,
    has_background: bool,
}

#[derive(Debug)]
struct PendingStroke {
    stroke: Stroke,
    pressure: Vec<f64>,
    coords: String,
}

#[derive(Debug)]
enum Frame {
    Page(PendingPage),
    Layer(Layer),
    Stroke(PendingStroke),
    Text(Text),
    Image { bounds: Rect, payload: String },
    TexImage { text: String, bounds: Rect, payload: String },
}

impl Frame {
    fn tag(&self) -> &'static str {
        match self {
            Frame::Page(_) => "page",
            Frame::Layer(_) => "layer",
            Frame::Stroke(_) => "stroke",
            Frame::Text(_) => "text",
            Frame::Image { .. } => "image",
            Frame::TexImage { .. } => "teximage",
        }
    }
}

/// Builds one [`Document`] from parser callbacks.
#[derive(Debug)]
pub(crate) struct ModelBuilder<'a> {
    document: Document,
    stack: Vec<Frame>,
    options: &'a ParseOptions,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            document: Document::new(),
            stack: Vec::new(),
            options,
        }
    }

    /// Read the root tag. Legacy files have no `fileversion` and may carry
    /// the writer version in `version` instead of `creator`.
    pub fn begin_document(&mut self, attrs: Attributes<'_>) -> Result<()> {
        self.document.file_version = attrs.optional_int("fileversion")?.unwrap_or(1);
        self.document.creator = match (attrs.optional("creator"), attrs.optional("version")) {
            (Some(creator), _) => creator.to_string(),
            (None, Some(version)) => format!("Xournal {}", version),
            (None, None) => "Unknown".to_string(),
        };
        log::debug!(
            "Document by {} (file version {})",
            self.document.creator,
            self.document.file_version
        );
        Ok(())
    }

    pub fn set_title(&mut self, title: String) {
        self.document.title = Some(title);
    }

    /// Index the page being built will have in the document.
    pub fn page_index(&self) -> usize {
        self.document.pages.len()
    }

    fn layer_index(&self) -> usize {
        self.stack
            .iter()
            .find_map(|frame| match frame {
                Frame::Page(p) => Some(p.page.layers.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn begin_page(&mut self, attrs: Attributes<'_>) -> Result<()> {
        let width = attrs.positive_f64("width")?;
        let height = attrs.positive_f64("height")?;
        self.stack.push(Frame::Page(PendingPage {
            page: Page::new(width, height),
            has_background: false,
        }));
        Ok(())
    }

    /// Attach the page background. A page has exactly one.
    pub fn set_background(&mut self, background: Background) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Page(pending)) => {
                if pending.has_background {
                    return Err(Error::InvalidContent {
                        element: "page",
                        reason: "more than one <background>".to_string(),
                    });
                }
                if !pending.page.layers.is_empty() {
                    return Err(Error::InvalidContent {
                        element: "page",
                        reason: "<background> after <layer>".to_string(),
                    });
                }
                pending.page.background = background;
                pending.has_background = true;
                Ok(())
            }
            _ => Err(Error::Other("<background> outside of a page".to_string())),
        }
    }

    pub fn begin_layer(&mut self, attrs: Attributes<'_>) {
        let layer = match attrs.optional("name") {
            Some(name) => Layer::with_name(name),
            None => Layer::new(),
        };
        self.stack.push(Frame::Layer(layer));
    }

    pub fn begin_stroke(&mut self, attrs: Attributes<'_>, warnings: &mut Warnings) -> Result<()> {
        let raw_tool = attrs.required("tool")?;
        let tool = StrokeTool::parse(raw_tool).unwrap_or_else(|| {
            warnings.push(LoadWarning::UnknownTool {
                value: raw_tool.to_string(),
            });
            StrokeTool::Pen
        });
        let color = parse_color(attrs, warnings)?;

        // Base width, optionally followed by one width per segment.
        let mut widths = attrs.required_f64_list("width")?;
        let pressure = widths.split_off(1);

        let mut stroke = Stroke::new(tool, color, widths[0]);
        stroke.fill = attrs.optional_int::<i32>("fill")?.filter(|&fill| fill >= 0);
        (stroke.timestamp, stroke.audio_filename) = parse_audio(attrs)?;

        self.stack.push(Frame::Stroke(PendingStroke {
            stroke,
            pressure,
            coords: String::new(),
        }));
        Ok(())
    }

    pub fn begin_text(&mut self, attrs: Attributes<'_>, warnings: &mut Warnings) -> Result<()> {
        let mut text = Text::new(
            attrs.required("font")?,
            attrs.positive_f64("size")?,
            parse_color(attrs, warnings)?,
            attrs.required_f64("x")?,
            attrs.required_f64("y")?,
        );
        (text.timestamp, text.audio_filename) = parse_audio(attrs)?;
        self.stack.push(Frame::Text(text));
        Ok(())
    }

    pub fn begin_image(&mut self, attrs: Attributes<'_>) -> Result<()> {
        let bounds = parse_bounds(attrs)?;
        self.stack.push(Frame::Image {
            bounds,
            payload: String::new(),
        });
        Ok(())
    }

    pub fn begin_tex_image(&mut self, attrs: Attributes<'_>) -> Result<()> {
        let text = if self.document.file_version >= TEXIMAGE_TEXT_REQUIRED_SINCE {
            attrs.required("text")?
        } else {
            attrs.optional("text").unwrap_or_default()
        };
        let bounds = parse_bounds(attrs)?;
        self.stack.push(Frame::TexImage {
            text: text.to_string(),
            bounds,
            payload: String::new(),
        });
        Ok(())
    }

    /// Accumulate character data for the innermost element.
    pub fn append_text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Stroke(pending)) => pending.coords.push_str(text),
            Some(Frame::Text(t)) => t.text.push_str(text),
            Some(Frame::Image { payload, .. }) | Some(Frame::TexImage { payload, .. }) => {
                payload.push_str(text)
            }
            _ => {}
        }
    }

    /// Seal the innermost frame, which must have been opened by `tag`.
    pub fn close(&mut self, tag: &str, warnings: &mut Warnings) -> Result<()> {
        let frame = match self.stack.pop() {
            Some(frame) if frame.tag() == tag => frame,
            Some(frame) => {
                return Err(Error::MismatchedEndTag {
                    expected: frame.tag().to_string(),
                    found: tag.to_string(),
                })
            }
            None => return Err(Error::Other(format!("</{}> with nothing open", tag))),
        };

        match frame {
            Frame::Page(pending) => self.seal_page(pending),
            Frame::Layer(layer) => self.seal_layer(layer),
            Frame::Stroke(pending) => {
                let stroke = self.finish_stroke(pending, warnings)?;
                self.push_element(Element::Stroke(stroke))
            }
            Frame::Text(text) => self.push_element(Element::Text(text)),
            Frame::Image { bounds, payload } => match self.decode_payload("image", &payload, warnings)? {
                Some(data) => self.push_element(Element::Image(Image { bounds, data })),
                None => Ok(()),
            },
            Frame::TexImage {
                text,
                bounds,
                payload,
            } => match self.decode_payload("teximage", &payload, warnings)? {
                Some(data) => self.push_element(Element::TexImage(TexImage { text, bounds, data })),
                None => Ok(()),
            },
        }
    }

    fn seal_page(&mut self, pending: PendingPage) -> Result<()> {
        if !pending.has_background {
            return Err(Error::InvalidContent {
                element: "page",
                reason: "missing <background>".to_string(),
            });
        }
        log::debug!(
            "Page {}: {}x{}, {} layers",
            self.document.pages.len() + 1,
            pending.page.width,
            pending.page.height,
            pending.page.layers.len()
        );
        self.document.add_page(pending.page);
        Ok(())
    }

    fn seal_layer(&mut self, layer: Layer) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Page(pending)) => {
                pending.page.add_layer(layer);
                Ok(())
            }
            _ => Err(Error::Other("<layer> outside of a page".to_string())),
        }
    }

    fn push_element(&mut self, element: Element) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Layer(layer)) => {
                layer.add_element(element);
                Ok(())
            }
            _ => Err(Error::Other(format!(
                "<{}> outside of a layer",
                element.kind()
            ))),
        }
    }

    fn finish_stroke(&self, pending: PendingStroke, warnings: &mut Warnings) -> Result<Stroke> {
        let PendingStroke {
            mut stroke,
            pressure,
            coords,
        } = pending;
        stroke.points = parse_points(&coords)?;

        if !pressure.is_empty() {
            if pressure.len() + 1 == stroke.points.len() {
                stroke.pressure = Some(pressure);
            } else {
                warnings.push(LoadWarning::PressureMismatch {
                    page: self.page_index(),
                    layer: self.layer_index(),
                    points: stroke.points.len(),
                    pressures: pressure.len(),
                });
            }
        }
        Ok(stroke)
    }

    /// Decode a payload; `None` means the element is dropped.
    fn decode_payload(
        &self,
        element: &'static str,
        payload: &str,
        warnings: &mut Warnings,
    ) -> Result<Option<Vec<u8>>> {
        if self.options.extract_mode == ExtractMode::StructureOnly {
            return Ok(Some(Vec::new()));
        }
        match decode_base64(element, payload) {
            Ok(data) => Ok(Some(data)),
            Err(Error::InvalidPayload { element, reason })
                if self.options.error_mode == ErrorMode::Lenient =>
            {
                warnings.push(LoadWarning::InvalidPayload {
                    element,
                    page: self.page_index(),
                    layer: self.layer_index(),
                    reason,
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Hand over the finished document. Fails if anything is still open.
    pub fn finish(self) -> Result<Document> {
        if let Some(frame) = self.stack.last() {
            return Err(Error::UnexpectedEof(format!("inside <{}>", frame.tag())));
        }
        Ok(self.document)
    }
}

fn parse_color(attrs: Attributes<'_>, warnings: &mut Warnings) -> Result<Color> {
    let raw = attrs.required("color")?;
    Ok(Color::parse(raw).unwrap_or_else(|| {
        warnings.push(LoadWarning::UnknownColor {
            element: attrs.element(),
            value: raw.to_string(),
        });
        Color::BLACK
    }))
}

fn parse_bounds(attrs: Attributes<'_>) -> Result<Rect> {
    Ok(Rect::new(
        attrs.required_f64("left")?,
        attrs.required_f64("top")?,
        attrs.required_f64("right")?,
        attrs.required_f64("bottom")?,
    ))
}

/// Audio link of a stroke or text: recording offset `ts` and file `fn`.
/// An empty `fn` means no recording.
fn parse_audio(attrs: Attributes<'_>) -> Result<(Option<i64>, Option<String>)> {
    let timestamp = attrs.optional_int::<i64>("ts")?;
    let filename = attrs
        .optional("fn")
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok((timestamp, filename))
}

/// Parse stroke character data: whitespace-separated `x y` pairs.
fn parse_points(coords: &str) -> Result<Vec<Point>> {
    let values = coords
        .split_ascii_whitespace()
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Error::InvalidContent {
                element: "stroke",
                reason: format!("invalid coordinate \"{}\"", token),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    if values.is_empty() {
        return Err(Error::InvalidContent {
            element: "stroke",
            reason: "no points".to_string(),
        });
    }
    if values.len() % 2 != 0 {
        return Err(Error::InvalidContent {
            element: "stroke",
            reason: format!("odd number of coordinates ({})", values.len()),
        });
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn builder_in_layer(options: &ParseOptions) -> ModelBuilder<'_> {
        let mut builder = ModelBuilder::new(options);
        let page = attrs(&[("width", "612"), ("height", "792")]);
        builder.begin_page(Attributes::new("page", &page)).unwrap();
        builder.set_background(Background::blank()).unwrap();
        builder.begin_layer(Attributes::new("layer", &[]));
        builder
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points(" 10 10\n20 20 30 10 ").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Point::new(30.0, 10.0));

        assert!(parse_points("").is_err());
        assert!(parse_points("1 2 3").is_err());
        assert!(parse_points("1 x").is_err());
    }

    #[test]
    fn test_stroke_with_pressure() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let mut warnings = Warnings::default();

        let list = attrs(&[("tool", "pen"), ("color", "red"), ("width", "2 1.5 1.8")]);
        builder
            .begin_stroke(Attributes::new("stroke", &list), &mut warnings)
            .unwrap();
        builder.append_text("0 0 5 5 ");
        builder.append_text("10 0");
        builder.close("stroke", &mut warnings).unwrap();
        builder.close("layer", &mut warnings).unwrap();
        builder.close("page", &mut warnings).unwrap();

        let doc = builder.finish().unwrap();
        let stroke = doc.pages[0].layers[0].elements[0].as_stroke().unwrap();
        assert_eq!(stroke.width, 2.0);
        assert_eq!(stroke.pressure, Some(vec![1.5, 1.8]));
        assert_eq!(stroke.color, Color::rgb(0xff, 0, 0));
        assert!(warnings.into_vec().is_empty());
    }

    #[test]
    fn test_pressure_mismatch_falls_back_to_width() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let mut warnings = Warnings::default();

        let list = attrs(&[("tool", "pen"), ("color", "black"), ("width", "2 1 1 1 1")]);
        builder
            .begin_stroke(Attributes::new("stroke", &list), &mut warnings)
            .unwrap();
        builder.append_text("0 0 5 5 10 0");
        builder.close("stroke", &mut warnings).unwrap();

        let warnings = warnings.into_vec();
        assert_eq!(
            warnings,
            vec![LoadWarning::PressureMismatch {
                page: 0,
                layer: 0,
                points: 3,
                pressures: 4
            }]
        );
    }

    #[test]
    fn test_second_background_rejected() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let mut warnings = Warnings::default();
        builder.close("layer", &mut warnings).unwrap();
        assert!(builder.set_background(Background::blank()).is_err());
    }

    #[test]
    fn test_background_after_layer_rejected() {
        let options = ParseOptions::default();
        let mut builder = ModelBuilder::new(&options);
        let mut warnings = Warnings::default();
        let page = attrs(&[("width", "612"), ("height", "792")]);
        builder.begin_page(Attributes::new("page", &page)).unwrap();
        builder.begin_layer(Attributes::new("layer", &[]));
        builder.close("layer", &mut warnings).unwrap();

        let err = builder.set_background(Background::blank()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidContent { element: "page", ref reason } if reason.contains("after <layer>")
        ));
    }

    #[test]
    fn test_audio_attributes() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let mut warnings = Warnings::default();

        let list = attrs(&[
            ("tool", "pen"),
            ("color", "black"),
            ("width", "1"),
            ("ts", "1234"),
            ("fn", "rec.ogg"),
        ]);
        builder
            .begin_stroke(Attributes::new("stroke", &list), &mut warnings)
            .unwrap();
        builder.append_text("0 0 5 5");
        builder.close("stroke", &mut warnings).unwrap();

        let list = attrs(&[
            ("font", "Sans"),
            ("size", "12"),
            ("x", "1"),
            ("y", "2"),
            ("color", "black"),
            ("ts", "99"),
            ("fn", ""),
        ]);
        builder
            .begin_text(Attributes::new("text", &list), &mut warnings)
            .unwrap();
        builder.append_text("said");
        builder.close("text", &mut warnings).unwrap();
        builder.close("layer", &mut warnings).unwrap();
        builder.close("page", &mut warnings).unwrap();

        let doc = builder.finish().unwrap();
        let elements = &doc.pages[0].layers[0].elements;

        let stroke = elements[0].as_stroke().unwrap();
        assert_eq!(stroke.timestamp, Some(1234));
        assert_eq!(stroke.audio_filename.as_deref(), Some("rec.ogg"));
        assert!(stroke.has_audio());

        let text = elements[1].as_text().unwrap();
        assert_eq!(text.timestamp, Some(99));
        assert!(!text.has_audio());

        let json = serde_json::to_value(&elements[0]).unwrap();
        assert_eq!(json["timestamp"], 1234);
        assert_eq!(json["audio_filename"], "rec.ogg");
    }

    #[test]
    fn test_invalid_audio_timestamp() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let mut warnings = Warnings::default();

        let list = attrs(&[("tool", "pen"), ("color", "black"), ("width", "1"), ("ts", "soon")]);
        let err = builder
            .begin_stroke(Attributes::new("stroke", &list), &mut warnings)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAttribute { element: "stroke", attribute: "ts", .. }
        ));
    }

    #[test]
    fn test_legacy_teximage_without_text() {
        let options = ParseOptions::default();
        let mut builder = builder_in_layer(&options);
        let list = attrs(&[("left", "0"), ("top", "0"), ("right", "10"), ("bottom", "10")]);

        builder.document.file_version = 1;
        builder.begin_tex_image(Attributes::new("teximage", &list)).unwrap();

        builder.document.file_version = 4;
        let err = builder
            .begin_tex_image(Attributes::new("teximage", &list))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute { element: "teximage", attribute: "text" }
        ));
    }

    #[test]
    fn test_unfinished_document() {
        let options = ParseOptions::default();
        let builder = builder_in_layer(&options);
        assert!(matches!(builder.finish(), Err(Error::UnexpectedEof(_))));
    }
}
