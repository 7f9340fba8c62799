// AST tree to DOT graph conversion
//
//  Copyright (C) 2026 The ast2dot Authors
//
//  This file is part of ast2dot.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Convert a stream of AST [`TreeEvent`]s into a DOT graph.
//!
//! [`Converter`] is a push-driven transducer:
//!   each event handler emits DOT statements through a [`DotWriter`]
//!   as soon as it has enough information to do so.
//! Nothing but a stack of open elements is retained,
//!   so memory use is proportional to the depth of the tree.
//!
//! Graph Shape
//! ===========
//! The graph is a tree rooted at a synthetic node named [`ROOT_ID`]:
//!
//!   - every element becomes a node,
//!       drawn as a box if its tag begins with an uppercase letter
//!         (an AST node; [`ElementKind::Node`])
//!       and without a border otherwise
//!         (a field of the enclosing node; [`ElementKind::Attr`]);
//!   - every element with character data gets one additional underlined
//!       leaf node holding that text;
//!         fragments of text are trimmed and joined by single spaces,
//!         since a run of text may arrive split
//!           (e.g. around entity references);
//!   - text is held only for the innermost open element:
//!       opening a child discards any text that preceded it,
//!       so in mixed content only text after the last child survives;
//!   - each parent has an edge to each of its children,
//!       emitted in pre-order.
//!
//! Node ids are a kind letter followed by a number drawn from a single
//!   counter that advances in document order
//!     (`N0`, `A1`, `N2`, ...).
//! Replaying the same input therefore produces byte-identical output.

use crate::{
    dot::{quote, DotWriter},
    error::{Error, Result},
    reader::TreeEvent,
};
use std::{fmt::Display, io::Write};
use tracing::{debug, trace};


/// Name of the graph and id of its synthetic root node.
pub const ROOT_ID: &str = "AST";

/// Classification of an element by the case of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Structural AST node;
    ///   tag begins with an uppercase character.
    Node,
    /// Field of the enclosing node;
    ///   any other tag.
    Attr,
}

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        match tag.chars().next() {
            Some(c) if c.is_uppercase() => Self::Node,
            _ => Self::Attr,
        }
    }

    /// Prefix of node ids of this kind.
    pub fn letter(self) -> char {
        match self {
            Self::Node => 'N',
            Self::Attr => 'A',
        }
    }

    fn shape(self) -> &'static str {
        match self {
            Self::Node => "box",
            Self::Attr => "none",
        }
    }
}

/// DOT node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    /// The synthetic root ([`ROOT_ID`]).
    Root,
    /// An element or text leaf.
    Element(ElementKind, usize),
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_ID),
            Self::Element(kind, n) => write!(f, "{}{n}", kind.letter()),
        }
    }
}

/// Tree-to-graph transducer.
///
/// State is reset by [`Converter::start_document`],
///   so a single instance may perform any number of conversions
///   one after another.
#[derive(Debug, Default)]
pub struct Converter {
    /// Next id number to allocate.
    next_id: usize,

    /// Open elements,
    ///   innermost last.
    /// The synthetic root is at the bottom for the duration of a
    ///   conversion.
    stack: Vec<NodeId>,

    /// Trimmed,
    ///   non-empty text fragments awaiting the close of the innermost
    ///   element.
    pending: Vec<String>,
}

impl Converter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Convert a complete event stream,
    ///   writing the graph to `dot`.
    ///
    /// The first error aborts the conversion;
    ///   anything already written to `dot` must then be discarded by the
    ///   caller.
    pub fn convert<I, W>(
        &mut self,
        events: I,
        dot: &mut DotWriter<W>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Result<TreeEvent>>,
        W: Write,
    {
        self.start_document(dot)?;

        for event in events {
            match event? {
                TreeEvent::Open { tag, location } => {
                    self.open_element(dot, &tag, location.as_deref())?
                }
                TreeEvent::Text(text) => self.text(&text),
                TreeEvent::Close { tag } => self.close_element(dot, &tag)?,
            }
        }

        self.end_document(dot)
    }

    /// Reset all state and begin the graph with its root node.
    pub fn start_document<W: Write>(
        &mut self,
        dot: &mut DotWriter<W>,
    ) -> Result<()> {
        self.next_id = 0;
        self.stack.clear();
        self.stack.push(NodeId::Root);
        self.pending.clear();

        debug!("starting AST graph");

        dot.start_graph(ROOT_ID)?;
        dot.declare_node(NodeId::Root, &[("shape", "doubleoctagon")])?;

        Ok(())
    }

    /// Finish the graph.
    ///
    /// Errors
    /// ======
    /// [`Error::UnbalancedTree`] if any element other than the synthetic
    ///   root is still open.
    pub fn end_document<W: Write>(
        &mut self,
        dot: &mut DotWriter<W>,
    ) -> Result<()> {
        match self.stack.as_slice() {
            [NodeId::Root] => (),
            _ => return Err(Error::UnbalancedTree(self.stack.len())),
        }

        self.stack.pop();
        self.pending.clear();

        debug!(nodes = self.next_id + 1, "finished AST graph");

        dot.end_graph()?;
        Ok(())
    }

    /// Declare a node for a newly opened element and link it to its
    ///   parent.
    ///
    /// Text pending for the parent is discarded.
    pub fn open_element<W: Write>(
        &mut self,
        dot: &mut DotWriter<W>,
        tag: &str,
        location: Option<&str>,
    ) -> Result<()> {
        let parent = self.top()?;
        let kind = ElementKind::of(tag);
        let id = self.alloc(kind);

        let label = match location {
            Some(location) => quote(&format!("{tag}\n({location})")),
            None => tag.to_string(),
        };

        trace!(%id, %parent, tag, "element");

        dot.declare_node(
            id,
            &[("label", label.as_str()), ("shape", kind.shape())],
        )?;
        dot.put_edge(parent, id, &[])?;

        if !self.pending.is_empty() {
            trace!(%parent, dropped = self.pending.len(), "text before child");
            self.pending.clear();
        }

        self.stack.push(id);

        Ok(())
    }

    /// Record character data of the innermost open element.
    ///
    /// Nothing is written until the element is closed,
    ///   at which point all fragments are coalesced into a single leaf.
    /// Text received while no element is open is discarded.
    pub fn text(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() || self.stack.is_empty() {
            return;
        }

        self.pending.push(content.to_string());
    }

    /// Emit the text leaf of the innermost element,
    ///   if any,
    ///   and close it.
    ///
    /// Errors
    /// ======
    /// [`Error::UnbalancedTree`] if no element is open.
    pub fn close_element<W: Write>(
        &mut self,
        dot: &mut DotWriter<W>,
        tag: &str,
    ) -> Result<()> {
        // The synthetic root is never closed by an element.
        if self.stack.len() < 2 {
            return Err(Error::UnbalancedTree(self.stack.len()));
        }

        let parent = self.top()?;

        if !self.pending.is_empty() {
            let label = quote(&self.pending.join(" "));
            self.pending.clear();

            let leaf = self.alloc(ElementKind::Node);

            trace!(%leaf, %parent, tag, "text");

            dot.declare_node(
                leaf,
                &[("label", label.as_str()), ("shape", "underline")],
            )?;
            dot.put_edge(parent, leaf, &[])?;
        }

        self.stack.pop();

        Ok(())
    }

    /// Current nesting depth,
    ///   including the synthetic root.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&self) -> Result<NodeId> {
        self.stack.last().copied().ok_or(Error::UnbalancedTree(0))
    }

    fn alloc(&mut self, kind: ElementKind) -> NodeId {
        let id = NodeId::Element(kind, self.next_id);
        self.next_id += 1;
        id
    }
}
