//! Element tree of a process definition, as handed over by the XML reader.

use alloc::string::String;
use alloc::vec::Vec;

use crate::IndexMap;

/// One element of a process definition.
///
/// Tags and attribute names may carry a namespace, either as a prefix
/// (`xsl:value-of`) or in Clark notation (`{http://...}value-of`). Lookups
/// always match on the local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingNode {
    /// Element tag, possibly namespaced.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: IndexMap<String, String>,
    /// Text content before the first child, if any.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<BindingNode>,
}

impl BindingNode {
    /// Create an element with no attributes, text or children.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: BindingNode) -> Self {
        self.children.push(child);
        self
    }

    /// The tag without its namespace.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// Whether the local name of the tag is `name`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    /// The value of the attribute whose local name is `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content, `None` when absent or blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// The first direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&BindingNode> {
        self.children.iter().find(|child| child.is(name))
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a BindingNode> {
        self.children.iter().filter(move |child| child.is(name))
    }

    /// All elements below this one, in document order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// The first element below this one named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BindingNode> {
        self.descendants().find(|node| node.is(name))
    }

    /// The first element below this one reached by `path`: a descendant
    /// named `path[0]`, then direct children named by the rest.
    #[must_use]
    pub fn find_path(&self, path: &[&str]) -> Option<&BindingNode> {
        let (first, rest) = path.split_first()?;
        self.descendants()
            .filter(|node| node.is(first))
            .find_map(|node| {
                rest.iter()
                    .try_fold(node, |current, name| current.child(name))
            })
    }

    /// The first element below this one named `name` that is not nested
    /// inside an element named `barrier`.
    #[must_use]
    pub fn find_outside(&self, name: &str, barrier: &str) -> Option<&BindingNode> {
        self.children.iter().find_map(|child| {
            if child.is(name) {
                Some(child)
            } else if child.is(barrier) {
                None
            } else {
                child.find_outside(name, barrier)
            }
        })
    }
}

/// Pre-order iterator over the elements below a [`BindingNode`].
pub struct Descendants<'a> {
    stack: Vec<&'a BindingNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a BindingNode;

    fn next(&mut self) -> Option<&'a BindingNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn local_name(name: &str) -> &str {
    match name.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
        Some((_, local)) => local,
        None => name.rsplit(':').next().unwrap_or(name),
    }
}
