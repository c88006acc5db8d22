//! 内存文档序列化为 HTML
use crate::dom::document::NodeKind;
use crate::dom::{Document, Dom, NodeId};
use crate::utils::{escape_attr, escape_text};

/// 空元素（无结束标签）
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::with_capacity(256);
    write_node(doc, node, &mut out);
    out
}

pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::with_capacity(256);
    for child in doc.child_nodes(node) {
        write_node(doc, child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        Some(NodeKind::Root) => {
            for child in doc.child_nodes(node) {
                write_node(doc, child, out);
            }
        }
        Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
        Some(NodeKind::Element(data)) => {
            out.push('<');
            out.push_str(&data.name);
            for (name, value) in &data.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&data.name.as_str()) {
                return;
            }
            for child in doc.child_nodes(node) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&data.name);
            out.push('>');
        }
        None => {}
    }
}
