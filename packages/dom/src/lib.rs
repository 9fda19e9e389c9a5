//! # Playground DOM
//!
//! Minimal markup tree used as the target of node DOM export and the source
//! of DOM import. Nodes carry a tag, ordered attributes and children; the
//! tree renders to HTML deterministically (attributes keep insertion order).

mod node;
mod render;

pub use node::{DomElement, DomNode};
pub use render::{escape_attribute, escape_text, render_html, RenderOptions};
