// AST to Graphviz DOT converter
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

//! Visualize parser AST dumps as Graphviz DOT graphs.
//!
//! The parser's debug output contains an XML rendering of the AST between
//!   marker lines.
//! This crate extracts that document
//!   ([`filter`]),
//!   reads it as a stream of events
//!   ([`reader`]),
//!   and transduces those events into a DOT graph
//!   ([`graph`], [`dot`]),
//!     all in a single pass.
//! [`pipeline::ast_to_dot`] composes these steps.

pub mod dot;
pub mod error;
pub mod filter;
pub mod fs;
pub mod graph;
pub mod pipeline;
pub mod reader;

pub use error::{Error, Result};
pub use pipeline::{ast_to_dot, Config, InputMode};
