//! HTML 片段解析器
//! 基于 lol_html 流式重写器：只读不改，按文档顺序接收开始标签 / 结束标签 / 文本块，
//! 在内存文档中还原节点树
use lol_html::{doc_text, element, EndTagHandler, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{Document, Dom, NodeId};
use crate::error::{TruncateError, TruncateResult};
use crate::utils::decode_entities;

/// 树构建状态：文档 + 当前打开的元素栈
#[derive(Debug)]
struct TreeBuilder {
    doc: Document,
    open: Vec<NodeId>,
    // 上一个文本节点，用于合并被切成多块的文本
    pending_text: Option<(NodeId, String)>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            open: Vec::new(),
            pending_text: None,
        }
    }

    fn current_parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn open_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.flush_text();
        let parent = self.current_parent();
        let node = self.doc.create_element(tag);
        for (name, value) in attrs {
            let value = decode_entities(&value).into_owned();
            self.doc.set_attribute(node, &name, &value);
        }
        self.doc.append_child(parent, node);
        self.open.push(node);
        node
    }

    /// 关闭元素：弹出栈直到该元素（容忍未闭合的子元素）
    fn close_element(&mut self, node: NodeId) {
        self.flush_text();
        if let Some(pos) = self.open.iter().rposition(|n| *n == node) {
            self.open.truncate(pos);
        }
    }

    fn push_text(&mut self, chunk: &str, last_in_node: bool) {
        let parent = self.current_parent();
        match &mut self.pending_text {
            Some((_, buf)) => buf.push_str(chunk),
            None => {
                let node = self.doc.create_text("");
                self.doc.append_child(parent, node);
                self.pending_text = Some((node, chunk.to_string()));
            }
        }
        if last_in_node {
            self.flush_text();
        }
    }

    fn flush_text(&mut self) {
        if let Some((node, raw)) = self.pending_text.take() {
            if raw.is_empty() {
                self.doc.detach(node);
            } else {
                self.doc.set_text(node, &decode_entities(&raw));
            }
        }
    }

    fn finish(&mut self) -> Document {
        self.flush_text();
        self.open.clear();
        std::mem::take(&mut self.doc)
    }
}

/// 解析 HTML 片段为内存文档
pub fn parse_fragment(html: &str) -> TruncateResult<Document> {
    let builder = Rc::new(RefCell::new(TreeBuilder::new()));
    let element_builder = Rc::clone(&builder);
    let text_builder = Rc::clone(&builder);

    let settings = Settings {
        strict: false,
        element_content_handlers: vec![element!("*", move |el| {
            let attrs = el
                .attributes()
                .iter()
                .map(|attr| (attr.name(), attr.value()))
                .collect::<Vec<_>>();
            let node = element_builder
                .borrow_mut()
                .open_element(&el.tag_name(), attrs);

            match el.end_tag_handlers() {
                Some(handlers) => {
                    let end_builder = Rc::clone(&element_builder);
                    let handler: EndTagHandler<'static> = Box::new(move |_end| {
                        end_builder.borrow_mut().close_element(node);
                        Ok(())
                    });
                    handlers.push(handler);
                }
                // 空元素（br/img 等）没有结束标签
                None => element_builder.borrow_mut().close_element(node),
            }
            Ok(())
        })],
        document_content_handlers: vec![doc_text!(move |t| {
            text_builder
                .borrow_mut()
                .push_text(t.as_str(), t.last_in_text_node());
            Ok(())
        })],
        ..Settings::default()
    };

    let mut rewriter = HtmlRewriter::new(settings, |_: &[u8]| {});
    rewriter
        .write(html.as_bytes())
        .map_err(|e| TruncateError::HtmlParseError(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| TruncateError::HtmlParseError(e.to_string()))?;

    let doc = builder.borrow_mut().finish();
    log::debug!("Parsed HTML fragment | bytes: {} | nodes: {}", html.len(), doc.len());
    Ok(doc)
}
