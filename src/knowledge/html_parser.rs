use tree_sitter::{Node, Parser};

use crate::knowledge::knowledge_model::{UiElement, normalize_space};

/// Tags that become `UiElement`s. Everything else is structural noise.
pub const SUPPORTED_TAGS: [&str; 5] = ["input", "button", "select", "textarea", "a"];

/// Tags a browser never nests inside themselves: a second start tag closes
/// the open one.
const SELF_CLOSING_ON_REPEAT: [&str; 2] = ["a", "button"];

// ============================================================================
// Parsing
// ============================================================================

/// Extract every supported interactive element from an HTML document, in
/// document order.
///
/// Parsing is lenient: unclosed or stray tags are recovered by the grammar's
/// error recovery, and start tags left stranded in an error region are still
/// emitted, with the text that directly follows them. A document without
/// supported tags yields an empty list. This never fails; a grammar load
/// failure is logged and treated as "no elements".
pub fn parse_html(html: &str) -> Vec<UiElement> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_html::LANGUAGE.into()) {
        tracing::error!("failed to load HTML grammar: {}", e);
        return Vec::new();
    }

    let Some(tree) = parser.parse(html, None) else {
        tracing::warn!("HTML parse produced no syntax tree");
        return Vec::new();
    };

    let source = html.as_bytes();
    let mut elements = Vec::new();

    // Pre-order walk with an explicit stack; deeply nested pages must not
    // exhaust the call stack.
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        let found = match node.kind() {
            "element" => to_ui_element(node, source),
            "start_tag" | "self_closing_tag" if is_orphan_tag(node) => orphan_tag_element(node, source),
            "tag_name" if is_loose_tag_name(node) => loose_token_element(node, source),
            _ => None,
        };
        if let Some(element) = found {
            elements.push(element);
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    tracing::debug!("parsed {} UI elements", elements.len());
    elements
}

fn to_ui_element(node: Node, source: &[u8]) -> Option<UiElement> {
    let tag_node = child_of_kind(node, &["start_tag", "self_closing_tag"])?;
    let tag = tag_name(tag_node, source)?;
    if !SUPPORTED_TAGS.contains(&tag.as_str()) {
        return None;
    }

    let text = if tag_node.kind() == "self_closing_tag" {
        String::new()
    } else {
        text_content(node, &tag, source)
    };

    Some(build_element(tag, collect_attributes(tag_node, source), text))
}

// ============================================================================
// Error recovery
// ============================================================================

/// A start tag the grammar could not attach to an element, typically one
/// swallowed by an error region around unclosed markup.
fn is_orphan_tag(tag_node: Node) -> bool {
    tag_node.parent().is_none_or(|parent| parent.kind() != "element")
}

/// Start tag without an element: attributes from the tag, text up to the next tag.
fn orphan_tag_element(tag_node: Node, source: &[u8]) -> Option<UiElement> {
    let tag = tag_name(tag_node, source)?;
    if !SUPPORTED_TAGS.contains(&tag.as_str()) {
        return None;
    }

    let text = if tag_node.kind() == "self_closing_tag" {
        String::new()
    } else {
        trailing_text(tag_node, source)
    };

    tracing::debug!("recovered unclosed <{}> from malformed markup", tag);
    Some(build_element(tag, collect_attributes(tag_node, source), text))
}

/// A `tag_name` token directly inside an error region, right after `<`: the
/// grammar gave up before reducing it to a start tag.
fn is_loose_tag_name(node: Node) -> bool {
    node.parent().is_some_and(|parent| parent.is_error())
        && node.prev_sibling().is_some_and(|prev| prev.kind() == "<")
}

/// Rebuild an element from the loose `<` tag_name attribute* `>` tokens.
fn loose_token_element(name_node: Node, source: &[u8]) -> Option<UiElement> {
    let tag = node_text(name_node, source).to_ascii_lowercase();
    if !SUPPORTED_TAGS.contains(&tag.as_str()) {
        return None;
    }

    let mut attributes = Vec::new();
    let mut text = String::new();
    let mut sibling = name_node.next_sibling();
    while let Some(current) = sibling {
        match current.kind() {
            "attribute" => push_attribute(&mut attributes, current, source),
            ">" => {
                text = trailing_text(current, source);
                break;
            }
            _ => break,
        }
        sibling = current.next_sibling();
    }

    tracing::debug!("recovered <{}> from loose tokens", tag);
    Some(build_element(tag, attributes, text))
}

/// Text and entity siblings directly following `node`, up to the next markup.
fn trailing_text(node: Node, source: &[u8]) -> String {
    let mut text = TextCollector::default();
    let mut sibling = node.next_sibling();
    while let Some(current) = sibling.filter(|s| matches!(s.kind(), "text" | "entity")) {
        text.push(current, source);
        sibling = current.next_sibling();
    }
    text.finish()
}

// ============================================================================
// Attributes
// ============================================================================

fn build_element(tag: String, attributes: Vec<(String, String)>, text: String) -> UiElement {
    let attr = |key: &str| {
        attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    };

    UiElement {
        id: attr("id"),
        name: attr("name"),
        input_type: attr("type"),
        text,
        class_list: attr("class").map(|c| c.split_whitespace().collect::<Vec<_>>().join(" ")),
        tag,
    }
}

/// Attribute name/value pairs of a start tag, in source order. Names are
/// lower-cased; valueless attributes map to the empty string.
fn collect_attributes(tag_node: Node, source: &[u8]) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut cursor = tag_node.walk();

    for attribute in tag_node.named_children(&mut cursor) {
        if attribute.kind() == "attribute" {
            push_attribute(&mut attributes, attribute, source);
        }
    }

    attributes
}

fn push_attribute(attributes: &mut Vec<(String, String)>, attribute: Node, source: &[u8]) {
    let Some(name) = child_of_kind(attribute, &["attribute_name"]) else {
        return;
    };
    let name = node_text(name, source).to_ascii_lowercase();

    let value = match child_of_kind(attribute, &["attribute_value", "quoted_attribute_value"]) {
        Some(v) if v.kind() == "quoted_attribute_value" => child_of_kind(v, &["attribute_value"])
            .map(|inner| decode_entities(node_text(inner, source)))
            .unwrap_or_default(),
        Some(v) => decode_entities(node_text(v, source)),
        None => String::new(),
    };

    // Duplicate attributes: the first occurrence wins, as in browsers.
    if !attributes.iter().any(|(existing, _)| *existing == name) {
        attributes.push((name, value));
    }
}

// ============================================================================
// Text content
// ============================================================================

/// Visible text of an element: every descendant text fragment, with
/// whitespace normalized and trimmed.
///
/// A nested element of the same tag is skipped for `a` and `button`, since a
/// browser closes the outer one there.
fn text_content(node: Node, tag: &str, source: &[u8]) -> String {
    let mut text = TextCollector::default();
    let splits_on_repeat = SELF_CLOSING_ON_REPEAT.contains(&tag);

    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current.kind() {
            "text" | "entity" => text.push(current, source),
            // Attribute values and raw script/style bodies are not visible text.
            "start_tag" | "self_closing_tag" | "end_tag" | "script_element" | "style_element"
            | "comment" => {}
            "element"
                if splits_on_repeat
                    && current.id() != node.id()
                    && element_tag(current, source).as_deref() == Some(tag) => {}
            _ => {
                let mut cursor = current.walk();
                let children: Vec<Node> = current.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    text.finish()
}

/// Joins text fragments with one space wherever the source had whitespace
/// between them outside of markup.
#[derive(Default)]
struct TextCollector {
    out: String,
    prev_end: Option<usize>,
}

impl TextCollector {
    fn push(&mut self, fragment: Node, source: &[u8]) {
        if let Some(end) = self.prev_end {
            let gap = source.get(end..fragment.start_byte()).unwrap_or_default();
            if !self.out.is_empty() && has_text_whitespace(gap) {
                self.out.push(' ');
            }
        }

        let raw = node_text(fragment, source);
        if fragment.kind() == "entity" {
            self.out.push_str(&decode_entities(raw));
        } else {
            self.out.push_str(raw);
        }
        self.prev_end = Some(fragment.end_byte());
    }

    fn finish(self) -> String {
        normalize_space(&self.out)
    }
}

/// Whether a gap between two text fragments contains whitespace outside of markup.
fn has_text_whitespace(gap: &[u8]) -> bool {
    let mut in_tag = false;
    for &b in gap {
        match b {
            b'<' => in_tag = true,
            b'>' => in_tag = false,
            b' ' | b'\t' | b'\n' | b'\r' if !in_tag => return true,
            _ => {}
        }
    }
    false
}

// ============================================================================
// Helpers
// ============================================================================

fn child_of_kind<'tree>(node: Node<'tree>, kinds: &[&str]) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    found
}

fn tag_name(tag_node: Node, source: &[u8]) -> Option<String> {
    child_of_kind(tag_node, &["tag_name"]).map(|n| node_text(n, source).to_ascii_lowercase())
}

fn element_tag(element: Node, source: &[u8]) -> Option<String> {
    let tag_node = child_of_kind(element, &["start_tag", "self_closing_tag"])?;
    tag_name(tag_node, source)
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Decode the character references that commonly appear in form markup.
/// Unknown references are kept verbatim.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&candidate[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('\u{a9}'),
        "reg" => Some('\u{ae}'),
        "hellip" => Some('\u{2026}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        _ => None,
    }
}
