//! Owned element tree
//!
//! A [`Node`] owns its name, attributes, optional text data and every child.
//! Children are grouped by tag name; each group keeps the document order of
//! that tag, and a separate arrival list keeps the order across groups.

use indexmap::IndexMap;

/// One parsed XML element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: IndexMap<String, String>,
    data: Option<String>,
    children: IndexMap<String, Vec<Node>>,
    /// (group index, index within group) for each child in arrival order
    order: Vec<(usize, usize)>,
}

impl Node {
    /// Create a node with no attributes, data or children.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Use [`Node::try_new`] for untrusted names.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "node name must not be empty");
        Self::unchecked(name)
    }

    /// Create a node, or `None` when `name` is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self::unchecked(name))
        }
    }

    fn unchecked(name: String) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            data: None,
            children: IndexMap::new(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of attribute `key`, if present
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attributes in the order they were first added
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Insert an attribute, overwriting any previous value for `key`.
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = Some(data.into());
    }

    /// First child named `name`
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children(name).first()
    }

    /// First child named `name` whose attribute `key` equals `value`.
    ///
    /// Children without `key` never match.
    pub fn child_with_attribute(&self, name: &str, key: &str, value: &str) -> Option<&Self> {
        self.children(name)
            .iter()
            .find(|child| child.attribute(key) == Some(value))
    }

    /// All children named `name`, in document order. Empty when there are none.
    pub fn children(&self, name: &str) -> &[Self] {
        self.children
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Child groups in order of first appearance
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Self])> {
        self.children
            .iter()
            .map(|(name, group)| (name.as_str(), group.as_slice()))
    }

    /// Every child in document order, regardless of tag name.
    pub fn children_in_order(&self) -> impl Iterator<Item = &Self> {
        self.order.iter().filter_map(|&(group, index)| {
            self.children
                .get_index(group)
                .and_then(|(_, nodes)| nodes.get(index))
        })
    }

    pub fn child_count(&self) -> usize {
        self.order.len()
    }

    /// Append `child` to the group for its name, taking ownership of it.
    pub fn add_child(&mut self, child: Self) {
        let entry = self.children.entry(child.name.clone());
        let group = entry.index();
        let nodes = entry.or_default();
        self.order.push((group, nodes.len()));
        nodes.push(child);
    }

    /// Walk a `/`-separated path of child names, taking the first child at
    /// each step. An empty path returns `self`.
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .try_fold(self, |node, step| node.child(step))
    }

    /// Release this node and all of its descendants, returning how many nodes
    /// were released.
    ///
    /// Dropping a `Node` has the same effect; this form walks the tree with an
    /// explicit stack so arbitrarily deep trees are released without recursion.
    pub fn destroy(self) -> usize {
        let mut released = 0;
        let mut stack = vec![self];
        while let Some(mut node) = stack.pop() {
            for (_, group) in node.children.drain(..) {
                stack.extend(group);
            }
            released += 1;
        }
        released
    }
}
