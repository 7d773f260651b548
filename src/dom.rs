use std::collections::HashMap;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) required: bool,
    pub(crate) disabled: bool,
}

/// Arena-backed document tree. Nodes are never deallocated; removal only
/// detaches them from their parent, so stale `NodeId` handles stay valid
/// and can be checked with `is_connected`.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attr_pairs: &[(&str, &str)],
    ) -> NodeId {
        let mut attrs = HashMap::new();
        for (name, value) in attr_pairs {
            attrs.insert((*name).to_string(), (*value).to_string());
        }
        let value = attrs.get("value").cloned().unwrap_or_default();
        let required = attrs.contains_key("required");
        let disabled = attrs.contains_key("disabled");
        let element = Element {
            tag_name: tag_name.to_string(),
            attrs,
            value,
            required,
            disabled,
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type: NodeType::Element(element),
        });
        self.nodes[parent.0].children.push(id);
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type: NodeType::Text(text.to_string()),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("attribute target is not an element".into()))?;
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn required(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.required).unwrap_or(false)
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn remove_children(&mut self, node_id: NodeId) {
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        self.rebuild_id_index();
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.0].node_type {
                NodeType::Element(element) => {
                    if let Some(id) = element.attrs.get("id") {
                        if !id.is_empty() {
                            next.insert(id.clone(), node);
                        }
                    }
                }
                NodeType::Document | NodeType::Text(_) => {}
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let steps = parse_selector(selector)?;
        Ok(self
            .all_element_nodes()
            .into_iter()
            .filter(|node| self.matches_chain(*node, &steps))
            .collect())
    }

    fn matches_chain(&self, node_id: NodeId, steps: &[SelectorStep]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, last) {
            return false;
        }

        let mut current = node_id;
        for step in steps[..steps.len() - 1].iter().rev() {
            let mut cursor = self.parent(current);
            let mut found = None;
            while let Some(ancestor) = cursor {
                if self.matches_step(ancestor, step) {
                    found = Some(ancestor);
                    break;
                }
                cursor = self.parent(ancestor);
            }
            let Some(found) = found else {
                return false;
            };
            current = found;
        }
        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        for class_name in &step.classes {
            if !has_class(element, class_name) {
                return false;
            }
        }
        for (name, expected) in &step.attrs {
            match (element.attrs.get(name), expected) {
                (Some(actual), Some(expected)) if actual == expected => {}
                (Some(_), None) => {}
                _ => return false,
            }
        }
        true
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut names = element.attrs.keys().collect::<Vec<_>>();
                names.sort();
                for name in names {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&element.attrs[name]);
                    out.push('"');
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone)]
struct SelectorStep {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

/// Compound steps joined by the descendant combinator only. Child,
/// sibling, and pseudo-class selectors are not part of this subset.
fn parse_selector(selector: &str) -> Result<Vec<SelectorStep>> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    if trimmed.contains([',', '>', '+', '~', ':']) {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    trimmed
        .split_whitespace()
        .map(|part| parse_compound(selector, part))
        .collect()
}

fn parse_compound(selector: &str, part: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let mut rest = part;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else if !rest.starts_with(['#', '.', '[']) {
        let (name, after) = read_name(rest);
        if name.is_empty() {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        step.tag = Some(name);
        rest = after;
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('#') {
            let (name, after) = read_name(after);
            if name.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            step.id = Some(name);
            rest = after;
        } else if let Some(after) = rest.strip_prefix('.') {
            let (name, after) = read_name(after);
            if name.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            step.classes.push(name);
            rest = after;
        } else if let Some(after) = rest.strip_prefix('[') {
            let Some(end) = after.find(']') else {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            };
            let body = &after[..end];
            match body.split_once('=') {
                Some((name, raw)) => {
                    let value = raw.trim_matches(|c| c == '"' || c == '\'');
                    step.attrs
                        .push((name.trim().to_string(), Some(value.to_string())));
                }
                None => step.attrs.push((body.trim().to_string(), None)),
            }
            rest = &after[end + 1..];
        } else {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
    }

    Ok(step)
}

fn read_name(input: &str) -> (String, &str) {
    let end = input
        .find(|c| matches!(c, '#' | '.' | '['))
        .unwrap_or(input.len());
    (input[..end].to_string(), &input[end..])
}

pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut out = input.chars().take(max_chars).collect::<String>();
    out.push('…');
    out
}
