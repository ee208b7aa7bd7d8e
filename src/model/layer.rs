//! Layers of drawable elements.

use super::Element;
use serde::{Deserialize, Serialize};

/// An ordered stack of elements; later elements are drawn on top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    pub name: Option<String>,
    pub elements: Vec<Element>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            elements: Vec::new(),
        }
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
