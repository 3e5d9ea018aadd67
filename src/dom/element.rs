use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents one element of the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "a", "span")
    pub tag_name: String,

    /// Element attributes (e.g., id, class, data-subreddit, style)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text content of the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Whether the element is a navigable node (a post row or a comment)
    #[serde(default)]
    pub is_node: bool,

    /// Whether the element groups the nested replies of its owning node
    #[serde(default)]
    pub is_child_group: bool,

    /// Whether the node hides its descendants
    #[serde(default)]
    pub collapsed: bool,
}

/// Class names used to tag elements once, when a page snapshot is loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Classifier {
    /// Classes marking a navigable node
    pub node_classes: Vec<String>,

    /// Classes that disqualify an element from being a node
    pub excluded_classes: Vec<String>,

    /// Class marking the container of a node's replies
    pub child_group_class: String,

    /// Class marking a collapsed node
    pub collapsed_class: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            node_classes: vec!["comment".to_string(), "link".to_string()],
            excluded_classes: vec!["promotedlink".to_string()],
            child_group_class: "child".to_string(),
            collapsed_class: "collapsed".to_string(),
        }
    }
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
            is_node: false,
            is_child_group: false,
            collapsed: false,
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set the class list
    pub fn with_class(self, classes: &str) -> Self {
        self.with_attribute("class", classes)
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Get a `data-*` attribute, e.g. `data("subreddit")`
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attributes.get(&format!("data-{}", key)).map(String::as_str)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        if let Some(classes) = self.attributes.get("class") {
            classes.split_whitespace().any(|c| c == class_name)
        } else {
            false
        }
    }

    /// Add a class if it is not present yet
    pub fn add_class(&mut self, class_name: &str) {
        if self.has_class(class_name) {
            return;
        }
        let classes = self.attributes.entry("class".to_string()).or_default();
        if !classes.trim().is_empty() {
            classes.push(' ');
        }
        classes.push_str(class_name);
    }

    /// Remove a class
    pub fn remove_class(&mut self, class_name: &str) {
        if let Some(classes) = self.attributes.get_mut("class") {
            *classes = classes
                .split_whitespace()
                .filter(|c| *c != class_name)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether a synthetic activation of this element is suppressed
    pub fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
    }

    /// Set the capability tags from the class list
    pub fn classify(&mut self, classifier: &Classifier) {
        let excluded = classifier.excluded_classes.iter().any(|c| self.has_class(c));
        self.is_node = !excluded && classifier.node_classes.iter().any(|c| self.has_class(c));
        self.is_child_group = self.has_class(&classifier.child_group_class);
        self.collapsed = self.is_node && self.has_class(&classifier.collapsed_class);
    }

    /// Read one inline style property
    pub fn style_property(&self, property: &str) -> Option<String> {
        let style = self.attributes.get("style")?;
        style.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            (name.trim() == property).then(|| value.trim().to_string())
        })
    }

    /// Set one inline style property, keeping the others in place
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut decls: Vec<(String, String)> = self
            .attributes
            .get("style")
            .map(|style| {
                style
                    .split(';')
                    .filter_map(|decl| {
                        let (name, value) = decl.split_once(':')?;
                        Some((name.trim().to_string(), value.trim().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        match decls.iter_mut().find(|(name, _)| name == property) {
            Some(decl) => decl.1 = value.to_string(),
            None => decls.push((property.to_string(), value.to_string())),
        }

        let style = decls
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        self.attributes.insert("style".to_string(), style);
    }

    /// Convert to a simplified string representation
    pub fn to_simple_string(&self) -> String {
        let mut parts = vec![format!("<{}", self.tag_name)];

        if let Some(id) = self.id() {
            parts.push(format!(" id=\"{}\"", id));
        }

        if let Some(class) = self.attributes.get("class") {
            parts.push(format!(" class=\"{}\"", class));
        }

        if let Some(subreddit) = self.data("subreddit") {
            parts.push(format!(" data-subreddit=\"{}\"", subreddit));
        }

        parts.push(">".to_string());

        if let Some(text) = &self.text_content {
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }

        parts.join("")
    }
}

impl Drop for ElementNode {
    // Flatten the subtree first so deep snapshots do not drop recursively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}
