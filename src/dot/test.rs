// Tests for Graphviz DOT writer
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

use super::*;

type Sut = DotWriter<Vec<u8>>;

fn output(sut: Sut) -> String {
    String::from_utf8(sut.into_inner()).expect("invalid UTF-8 output")
}

#[test]
fn empty_graph() {
    let mut sut = Sut::new(vec![]);

    sut.start_graph("G").unwrap();
    sut.end_graph().unwrap();

    assert_eq!(output(sut), "digraph G {\n}\n");
}

#[test]
fn nodes_and_edges_are_indented_within_graph() {
    let mut sut = Sut::new(vec![]);

    sut.start_graph("G").unwrap();
    sut.declare_node("a", &[]).unwrap();
    sut.declare_node("b", &[("shape", "box")]).unwrap();
    sut.put_edge("a", "b", &[]).unwrap();
    sut.end_graph().unwrap();

    assert_eq!(
        output(sut),
        "digraph G {\n\
         \ta\n\
         \tb [shape=box]\n\
         \ta -> b\n\
         }\n",
    );
}

#[test]
fn attributes_retain_call_order() {
    let mut sut = Sut::new(vec![]);

    sut.declare_node("n", &[("shape", "none"), ("label", "x")])
        .unwrap();
    sut.put_edge("n", "m", &[("label", "\"e\""), ("color", "red")])
        .unwrap();

    assert_eq!(
        output(sut),
        "n [shape=none label=x]\nn -> m [label=\"e\" color=red]\n",
    );
}

#[test]
fn nested_graph_indentation() {
    let mut sut = Sut::new(vec![]);

    sut.start_graph("outer").unwrap();
    sut.start_graph("inner").unwrap();
    sut.declare_node("x", &[]).unwrap();
    sut.end_graph().unwrap();
    sut.end_graph().unwrap();

    assert_eq!(
        output(sut),
        "digraph outer {\n\tdigraph inner {\n\t\tx\n\t}\n}\n",
    );
}

#[test]
fn unbalanced_end_graph_does_not_underflow() {
    let mut sut = Sut::new(vec![]);

    sut.end_graph().unwrap();
    sut.declare_node("x", &[]).unwrap();

    assert_eq!(output(sut), "}\nx\n");
}

#[test]
fn ids_may_be_any_display() {
    let mut sut = Sut::new(vec![]);

    sut.put_edge(1, 'b', &[]).unwrap();

    assert_eq!(output(sut), "1 -> b\n");
}

#[test]
fn quote_plain() {
    assert_eq!(quote("hello world"), "\"hello world\"");
}

#[test]
fn quote_escapes_quotes_and_backslashes() {
    assert_eq!(quote(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
}

#[test]
fn quote_newline_becomes_line_break() {
    assert_eq!(quote("child\n(1:2)"), r#""child\n(1:2)""#);
}

#[test]
fn quote_drops_other_control_characters() {
    assert_eq!(quote("a\r\nb\u{7}c\td"), "\"a\\nbc\td\"");
}

#[test]
fn quote_retains_non_ascii() {
    assert_eq!(quote("λ → µ"), "\"λ → µ\"");
}
