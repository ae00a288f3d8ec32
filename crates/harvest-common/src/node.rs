//! Document capability set the resolution engine consumes.
//!
//! The engine never touches a concrete DOM. Adapters implement
//! [`DocumentNode`] for their node handle and [`DocumentFactory`] for loading
//! raw markup.

use crate::error::DocumentError;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a node of a loaded document.
pub type Node = Rc<dyn DocumentNode>;

pub trait DocumentNode: fmt::Debug {
    /// All descendants matching `query`, in document order.
    fn find_all(&self, query: &str) -> Result<Vec<Node>, DocumentError>;

    /// First descendant matching `query`.
    fn find_first(&self, query: &str) -> Result<Option<Node>, DocumentError> {
        Ok(self.find_all(query)?.into_iter().next())
    }

    fn parent(&self) -> Option<Node>;

    /// Concatenated text of the node and its descendants.
    fn text(&self) -> String;

    fn inner_html(&self) -> String;

    fn outer_html(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Identity comparison. Two handles are the same node when they point at
    /// the same position of the same document.
    fn same_node(&self, other: &dyn DocumentNode) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// Loads raw markup into a root node.
pub trait DocumentFactory {
    fn load(&self, html: &str) -> Result<Node, DocumentError>;
}
