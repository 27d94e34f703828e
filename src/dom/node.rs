use std::collections::HashMap;

use super::{ElementId, Overflow};

/// Element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    #[default]
    Div,
    Button,
    /// Mounts its children directly into the parent, like a document fragment.
    Fragment,
}

/// Marks nodes whose mounted element ids the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Backdrop,
    Container,
    CloseButton,
    Content,
    Footer,
    FooterBody,
    FooterButton(usize),
    Probe,
}

/// Immutable description of an element subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub tag: Tag,
    pub key: Option<NodeKey>,
    pub classes: Vec<String>,
    pub markup: Option<String>,
    pub overflow: Overflow,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn div() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn button() -> Self {
        Self {
            tag: Tag::Button,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fragment(children: Vec<Self>) -> Self {
        Self {
            tag: Tag::Fragment,
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn key(mut self, key: NodeKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    #[must_use]
    pub const fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// First node in depth-first order carrying `key`.
    #[must_use]
    pub fn find(&self, key: NodeKey) -> Option<&Self> {
        if self.key == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

/// Result of mounting a [`Node`] tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mounted {
    /// Element created for the root node. For a fragment root this is the
    /// parent it was mounted into.
    pub root: ElementId,
    keys: HashMap<NodeKey, ElementId>,
}

impl Mounted {
    #[must_use]
    pub fn new(root: ElementId) -> Self {
        Self {
            root,
            keys: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: NodeKey, element: ElementId) {
        self.keys.insert(key, element);
    }

    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<ElementId> {
        self.keys.get(&key).copied()
    }
}
