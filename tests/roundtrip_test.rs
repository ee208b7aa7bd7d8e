//! Writes documents with a minimal serializer and checks they load back
//! unchanged.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use unxoj::{
    load_file, Background, BackgroundStyle, Color, Document, Element, Image, Layer, Page, Point,
    Rect, Stroke, StrokeTool, TexImage, Text,
};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn style_name(style: BackgroundStyle) -> &'static str {
    match style {
        BackgroundStyle::Plain => "plain",
        BackgroundStyle::Lined => "lined",
        BackgroundStyle::Ruled => "ruled",
        BackgroundStyle::Graph => "graph",
        BackgroundStyle::Dotted => "dotted",
    }
}

fn tool_name(tool: StrokeTool) -> &'static str {
    match tool {
        StrokeTool::Pen => "pen",
        StrokeTool::Eraser => "eraser",
        StrokeTool::Highlighter => "highlighter",
    }
}

fn write_audio(out: &mut String, timestamp: Option<i64>, filename: Option<&str>) {
    if let Some(ts) = timestamp {
        let _ = write!(out, " ts=\"{}\"", ts);
    }
    if let Some(name) = filename {
        let _ = write!(out, " fn=\"{}\"", escape(name));
    }
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Stroke(s) => {
            let mut widths = s.width.to_string();
            for p in s.pressure.iter().flatten() {
                let _ = write!(widths, " {}", p);
            }
            let _ = write!(
                out,
                "<stroke tool=\"{}\" color=\"{}\" width=\"{}\"",
                tool_name(s.tool),
                s.color,
                widths
            );
            if let Some(fill) = s.fill {
                let _ = write!(out, " fill=\"{}\"", fill);
            }
            write_audio(out, s.timestamp, s.audio_filename.as_deref());
            out.push('>');
            for point in &s.points {
                let _ = write!(out, "{} {} ", point.x, point.y);
            }
            out.push_str("</stroke>\n");
        }
        Element::Text(t) => {
            let _ = write!(
                out,
                "<text font=\"{}\" size=\"{}\" x=\"{}\" y=\"{}\" color=\"{}\"",
                escape(&t.font),
                t.size,
                t.x,
                t.y,
                t.color
            );
            write_audio(out, t.timestamp, t.audio_filename.as_deref());
            let _ = writeln!(out, ">{}</text>", escape(&t.text));
        }
        Element::Image(i) => {
            let _ = writeln!(
                out,
                "<image left=\"{}\" top=\"{}\" right=\"{}\" bottom=\"{}\">{}</image>",
                i.bounds.left,
                i.bounds.top,
                i.bounds.right,
                i.bounds.bottom,
                STANDARD.encode(&i.data)
            );
        }
        Element::TexImage(t) => {
            let _ = writeln!(
                out,
                "<teximage text=\"{}\" left=\"{}\" top=\"{}\" right=\"{}\" bottom=\"{}\">{}</teximage>",
                escape(&t.text),
                t.bounds.left,
                t.bounds.top,
                t.bounds.right,
                t.bounds.bottom,
                STANDARD.encode(&t.data)
            );
        }
    }
}

fn to_xml(doc: &Document) -> String {
    let mut out = String::from("<?xml version=\"1.0\" standalone=\"no\"?>\n");
    let _ = writeln!(
        out,
        "<xournal creator=\"{}\" fileversion=\"{}\">",
        escape(&doc.creator),
        doc.file_version
    );
    if let Some(ref title) = doc.title {
        let _ = writeln!(out, "<title>{}</title>", escape(title));
    }
    for page in &doc.pages {
        let _ = writeln!(out, "<page width=\"{}\" height=\"{}\">", page.width, page.height);
        match &page.background {
            Background::Solid { color, style } => {
                let _ = writeln!(
                    out,
                    "<background type=\"solid\" color=\"{}\" style=\"{}\"/>",
                    color,
                    style_name(*style)
                );
            }
            other => panic!("writer does not support {} backgrounds", other.kind()),
        }
        for layer in &page.layers {
            match layer.name {
                Some(ref name) => {
                    let _ = writeln!(out, "<layer name=\"{}\">", escape(name));
                }
                None => out.push_str("<layer>\n"),
            }
            for element in &layer.elements {
                write_element(&mut out, element);
            }
            out.push_str("</layer>\n");
        }
        out.push_str("</page>\n");
    }
    out.push_str("</xournal>\n");
    out
}

fn save(doc: &Document, path: &Path) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(to_xml(doc).as_bytes()).unwrap();
    fs::write(path, encoder.finish().unwrap()).unwrap();
}

fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.creator = "unxoj tests".to_string();
    doc.file_version = 4;
    doc.title = Some("Notes <draft> & more".to_string());

    let mut pen = Stroke::new(StrokeTool::Pen, Color::from_rgb_u32(0x3333cc), 1.41);
    pen.points = vec![
        Point::new(10.5, 20.25),
        Point::new(11.0, 21.0),
        Point::new(12.125, 23.5),
    ];
    pen.pressure = Some(vec![0.9, 1.3]);
    pen.timestamp = Some(5120);
    pen.audio_filename = Some("lecture 3.ogg".to_string());

    let mut marker = Stroke::new(StrokeTool::Highlighter, Color::parse("#ffff0080").unwrap(), 8.5);
    marker.points = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.1)];
    marker.fill = Some(128);

    let mut first = Layer::with_name("ink \"main\"");
    first.add_element(Element::Stroke(pen));
    let mut formula = Text::new("Sans Bold", 12.0, Color::rgb(0xff, 0, 0), 72.0, 144.5);
    formula.text = "E = mc² <approx>".to_string();
    formula.timestamp = Some(7300);
    first.add_element(Element::Text(formula));

    let mut second = Layer::new();
    second.add_element(Element::Stroke(marker));
    second.add_element(Element::Image(Image {
        bounds: Rect::new(10.0, 10.0, 110.0, 60.0),
        data: (0u8..=255).collect(),
    }));
    second.add_element(Element::TexImage(TexImage {
        text: "\\frac{a}{b}".to_string(),
        bounds: Rect::new(200.0, 200.0, 240.0, 230.0),
        data: b"%PDF-1.5 formula".to_vec(),
    }));

    let mut page1 = Page::new(612.0, 792.0);
    page1.background = Background::Solid {
        color: Color::parse_background("yellow").unwrap(),
        style: BackgroundStyle::Ruled,
    };
    page1.add_layer(first);
    page1.add_layer(second);

    let mut page2 = Page::a4();
    page2.background = Background::Solid {
        color: Color::WHITE,
        style: BackgroundStyle::Dotted,
    };

    let mut page3 = Page::new(792.0, 612.0);
    page3.add_layer(Layer::new());

    doc.add_page(page1);
    doc.add_page(page2);
    doc.add_page(page3);
    doc
}

#[test]
fn test_roundtrip_preserves_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundtrip.xopp");

    let mut original = sample_document();
    save(&original, &path);

    let loaded = load_file(&path).unwrap();
    original.filename = Some(path.clone());
    assert_eq!(loaded, original);
}

#[test]
fn test_roundtrip_twice_is_stable() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.xopp");
    let second = dir.path().join("second.xopp");

    save(&sample_document(), &first);
    let loaded = load_file(&first).unwrap();
    save(&loaded, &second);
    let reloaded = load_file(&second).unwrap();

    assert_eq!(to_xml(&loaded), to_xml(&reloaded));
    assert!(reloaded.pages[2].is_landscape());
}
