//! Parser position: the single active state of a load.

use std::fmt;

/// Where the loader currently is in the document structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserPosition {
    /// Waiting for the `<xournal>` root
    #[default]
    NotStarted,
    /// Inside the root, waiting for pages or metadata
    Started,
    /// Inside `<page>`
    InPage,
    /// Inside `<layer>`
    InLayer,
    /// Inside `<stroke>`
    InStroke,
    /// Inside `<text>`
    InText,
    /// Inside `<image>`
    InImage,
    /// Inside `<teximage>`
    InTexImage,
    /// Root closed; nothing else may follow
    Finished,
}

/// What a legal start tag means for the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Descend into a new position.
    Enter(ParserPosition),
    /// Element handled without leaving the current position
    /// (`background` inside a page, metadata inside the root).
    Inline,
}

impl ParserPosition {
    /// Transition for a start tag, or `None` if the tag is illegal here.
    pub fn on_start(self, tag: &str) -> Option<Transition> {
        use ParserPosition::*;
        use Transition::*;

        match (self, tag) {
            (NotStarted, "xournal") => Some(Enter(Started)),
            (Started, "page") => Some(Enter(InPage)),
            (Started, "title" | "preview") => Some(Inline),
            (InPage, "background") => Some(Inline),
            (InPage, "layer") => Some(Enter(InLayer)),
            (InLayer, "stroke") => Some(Enter(InStroke)),
            (InLayer, "text") => Some(Enter(InText)),
            (InLayer, "image") => Some(Enter(InImage)),
            (InLayer, "teximage") => Some(Enter(InTexImage)),
            _ => None,
        }
    }

    /// Tag whose end closes this position.
    pub fn closing_tag(self) -> Option<&'static str> {
        use ParserPosition::*;

        match self {
            Started => Some("xournal"),
            InPage => Some("page"),
            InLayer => Some("layer"),
            InStroke => Some("stroke"),
            InText => Some("text"),
            InImage => Some("image"),
            InTexImage => Some("teximage"),
            NotStarted | Finished => None,
        }
    }

    /// Position after the closing tag of this one.
    pub fn parent(self) -> Option<ParserPosition> {
        use ParserPosition::*;

        match self {
            Started => Some(Finished),
            InPage => Some(Started),
            InLayer => Some(InPage),
            InStroke | InText | InImage | InTexImage => Some(InLayer),
            NotStarted | Finished => None,
        }
    }

    /// Positions whose character data is meaningful.
    pub fn accepts_text(self) -> bool {
        matches!(
            self,
            ParserPosition::InStroke
                | ParserPosition::InText
                | ParserPosition::InImage
                | ParserPosition::InTexImage
        )
    }
}

impl fmt::Display for ParserPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParserPosition::NotStarted => "waiting for <xournal>",
            ParserPosition::Started => "in <xournal>",
            ParserPosition::InPage => "in <page>",
            ParserPosition::InLayer => "in <layer>",
            ParserPosition::InStroke => "in <stroke>",
            ParserPosition::InText => "in <text>",
            ParserPosition::InImage => "in <image>",
            ParserPosition::InTexImage => "in <teximage>",
            ParserPosition::Finished => "after </xournal>",
        };
        f.write_str(s)
    }
}
