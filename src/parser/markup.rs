//! Push-style markup tokenizer.
//!
//! Wraps `quick_xml::Reader` and forwards start-element, end-element and
//! character-data events to a [`MarkupHandler`] in source order, without
//! building a tree. Whitespace is never trimmed here: a single logical text
//! run may arrive in several `characters` calls (plain text, CDATA sections
//! and entity references are separate tokens), so handlers accumulate.

use std::fmt::Display;
use std::io::BufRead;
use std::str;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// A name/value pair from a start tag, value unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Receiver of tokenizer events.
///
/// Returning an error from any callback stops the parse and the error is
/// returned from [`MarkupParser::run`].
pub trait MarkupHandler {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<()>;
    fn end_element(&mut self, name: &str) -> Result<()>;
    fn characters(&mut self, text: &str) -> Result<()>;
}

/// Streaming tokenizer over a buffered source.
pub struct MarkupParser<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    open: Vec<String>,
}

impl<R: BufRead> MarkupParser<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        // Nesting is checked against our own stack to report typed errors.
        reader.config_mut().check_end_names = false;
        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Byte offset in the (decompressed) input.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Tokenize the whole input, pushing events into `handler`.
    pub fn run<H: MarkupHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(Error::Xml {
                        position: self.reader.error_position() as u64,
                        message: e.to_string(),
                    })
                }
            };
            let position = self.reader.buffer_position() as u64;

            match event {
                Event::Start(e) => {
                    let (name, attributes) = read_start(&e, position)?;
                    handler.start_element(&name, &attributes)?;
                    self.open.push(name);
                }
                Event::Empty(e) => {
                    let (name, attributes) = read_start(&e, position)?;
                    handler.start_element(&name, &attributes)?;
                    handler.end_element(&name)?;
                }
                Event::End(e) => {
                    let qname = e.name();
                    let name = utf8(qname.as_ref(), position)?;
                    match self.open.pop() {
                        Some(expected) if expected == name => {}
                        Some(expected) => {
                            return Err(Error::MismatchedEndTag {
                                expected,
                                found: name.to_string(),
                            })
                        }
                        None => {
                            return Err(Error::Xml {
                                position,
                                message: format!("unmatched end tag </{}>", name),
                            })
                        }
                    }
                    handler.end_element(name)?;
                }
                Event::Text(t) => {
                    let text = t.decode().map_err(|e| xml_error(position, e))?;
                    if !text.is_empty() {
                        handler.characters(&text)?;
                    }
                }
                Event::CData(c) => {
                    let text = c.decode().map_err(|e| xml_error(position, e))?;
                    handler.characters(&text)?;
                }
                Event::GeneralRef(r) => {
                    if let Some(ch) = r.resolve_char_ref().map_err(|e| xml_error(position, e))? {
                        let mut utf8 = [0u8; 4];
                        handler.characters(ch.encode_utf8(&mut utf8))?;
                    } else {
                        let entity = r.decode().map_err(|e| xml_error(position, e))?;
                        let resolved = resolve_predefined_entity(&entity).ok_or_else(|| {
                            xml_error(position, format!("unknown entity &{};", entity))
                        })?;
                        handler.characters(resolved)?;
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = self.open.last() {
            return Err(Error::UnexpectedEof(format!("inside <{}>", open)));
        }
        Ok(())
    }
}

fn read_start(e: &BytesStart<'_>, position: u64) -> Result<(String, Vec<Attribute>)> {
    let name = utf8(e.name().as_ref(), position)?.to_string();
    let mut attributes = Vec::new();
    for a in e.attributes() {
        let a = a.map_err(|err| xml_error(position, format!("<{}>: {}", name, err)))?;
        let key = utf8(a.key.as_ref(), position)?.to_string();
        let value = a
            .unescape_value()
            .map_err(|err| xml_error(position, format!("<{} {}>: {}", name, key, err)))?
            .into_owned();
        attributes.push(Attribute { name: key, value });
    }
    Ok((name, attributes))
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str> {
    str::from_utf8(bytes).map_err(|e| xml_error(position, e))
}

fn xml_error(position: u64, err: impl Display) -> Error {
    Error::Xml {
        position,
        message: err.to_string(),
    }
}
