//! `scraper`-backed document adapter.
//!
//! A [`ScraperNode`] is a cheap handle: the parsed document behind an `Rc`
//! plus the arena id of the node it points at.

use ego_tree::{NodeId, NodeRef};
use harvest_common::{DocumentError, DocumentFactory, DocumentNode, Node};
use scraper::{ElementRef, Html, Selector};
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

#[derive(Clone)]
pub struct ScraperNode {
    doc: Rc<Html>,
    id: NodeId,
}

impl ScraperNode {
    /// Handle to the document root of `doc`.
    pub fn root(doc: Rc<Html>) -> Self {
        let id = doc.tree.root().id();
        Self { doc, id }
    }

    pub fn parse_document(html: &str) -> Self {
        Self::root(Rc::new(Html::parse_document(html)))
    }

    pub fn parse_fragment(html: &str) -> Self {
        Self::root(Rc::new(Html::parse_fragment(html)))
    }

    fn node_ref(&self) -> Option<NodeRef<'_, scraper::Node>> {
        self.doc.tree.get(self.id)
    }

    fn element(&self) -> Option<ElementRef<'_>> {
        self.node_ref().and_then(ElementRef::wrap)
    }

    fn is_document(&self) -> bool {
        self.node_ref()
            .map(|node| node.value().is_document() || node.value().is_fragment())
            .unwrap_or(false)
    }

    fn handle(&self, id: NodeId) -> Node {
        Rc::new(ScraperNode {
            doc: Rc::clone(&self.doc),
            id,
        })
    }
}

fn compile(query: &str) -> Result<Selector, DocumentError> {
    Selector::parse(query).map_err(|e| DocumentError::InvalidQuery {
        query: query.to_string(),
        reason: format!("{:?}", e),
    })
}

impl DocumentNode for ScraperNode {
    fn find_all(&self, query: &str) -> Result<Vec<Node>, DocumentError> {
        let selector = compile(query)?;
        let ids: Vec<NodeId> = match self.element() {
            Some(element) => element.select(&selector).map(|m| m.id()).collect(),
            None if self.is_document() => self.doc.select(&selector).map(|m| m.id()).collect(),
            None => Vec::new(),
        };
        trace!(query, matches = ids.len(), "find_all");
        Ok(ids.into_iter().map(|id| self.handle(id)).collect())
    }

    fn parent(&self) -> Option<Node> {
        let parent = self.node_ref()?.parent()?;
        // The document itself is not reported as a parent.
        if parent.value().is_document() || parent.value().is_fragment() {
            return None;
        }
        Some(self.handle(parent.id()))
    }

    fn text(&self) -> String {
        let mut out = String::new();
        if let Some(node) = self.node_ref() {
            for descendant in node.descendants() {
                if let Some(text) = descendant.value().as_text() {
                    out.push_str(text);
                }
            }
        }
        out
    }

    fn inner_html(&self) -> String {
        match self.element() {
            Some(element) => element.inner_html(),
            None if self.is_document() => self.doc.html(),
            None => String::new(),
        }
    }

    fn outer_html(&self) -> String {
        match self.element() {
            Some(element) => element.html(),
            None if self.is_document() => self.doc.html(),
            None => String::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element()?.value().attr(name).map(str::to_string)
    }

    fn same_node(&self, other: &dyn DocumentNode) -> bool {
        other
            .as_any()
            .downcast_ref::<ScraperNode>()
            .map(|other| Rc::ptr_eq(&self.doc, &other.doc) && self.id == other.id)
            .unwrap_or(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ScraperNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element() {
            Some(element) => write!(f, "ScraperNode(<{}>)", element.value().name()),
            None => write!(f, "ScraperNode(#document)"),
        }
    }
}

/// Loads markup with `scraper`, either as a full document or as a fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperFactory {
    fragment: bool,
}

impl ScraperFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment() -> Self {
        Self { fragment: true }
    }
}

impl DocumentFactory for ScraperFactory {
    fn load(&self, html: &str) -> Result<Node, DocumentError> {
        let node = if self.fragment {
            ScraperNode::parse_fragment(html)
        } else {
            ScraperNode::parse_document(html)
        };
        Ok(Rc::new(node))
    }
}
