//! Pure construction of a modal's node tree.
//!
//! Nothing here touches a host. The output is mounted by
//! [`Host::mount`](crate::dom::Host::mount), which hands back the element ids
//! for every [`NodeKey`] used below.

use tracing::debug;

use super::{
    BACKDROP_CLASS, CLOSE_CLASS, CLOSE_LABEL, CONTAINER_CLASS, CONTENT_CLASS, FOOTER_BODY_CLASS,
    FOOTER_CLASS, FooterButton, PROBE_CLASS,
};
use crate::dom::{Node, NodeKey, Overflow};

/// What goes into the content region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<'a> {
    Markup(&'a str),
    /// Cloned template content.
    Template(Node),
}

#[derive(Debug, Clone, Copy)]
pub struct FooterInput<'a> {
    pub content: Option<&'a str>,
    pub buttons: &'a [FooterButton],
}

#[derive(Debug, Clone)]
pub struct BuildInput<'a> {
    pub content: Content<'a>,
    pub css_class: &'a [String],
    pub close_button: bool,
    /// `None` when the footer is disabled.
    pub footer: Option<FooterInput<'a>>,
}

/// Build the backdrop subtree for a modal.
#[must_use]
pub fn build(input: &BuildInput<'_>) -> Node {
    let mut container = Node::div().key(NodeKey::Container).class(CONTAINER_CLASS);
    for class in input.css_class {
        if is_class_token(class) {
            container = container.class(class.as_str());
        } else {
            debug!(class = %class, "Skipping invalid css class");
        }
    }

    if input.close_button {
        container = container.child(
            Node::button()
                .key(NodeKey::CloseButton)
                .class(CLOSE_CLASS)
                .markup(CLOSE_LABEL),
        );
    }

    let content = Node::div().key(NodeKey::Content).class(CONTENT_CLASS);
    container = container.child(match &input.content {
        Content::Markup(markup) => content.markup(*markup),
        Content::Template(template) => content.child(template.clone()),
    });

    if let Some(footer) = &input.footer {
        container = container.child(footer_node(footer));
    }

    Node::div()
        .key(NodeKey::Backdrop)
        .class(BACKDROP_CLASS)
        .child(container)
}

/// A single footer button, keyed by its position in the footer.
///
/// The css class is a class attribute value, so it may name several classes.
#[must_use]
pub fn footer_button(index: usize, button: &FooterButton) -> Node {
    button.css_class.split_whitespace().fold(
        Node::button()
            .key(NodeKey::FooterButton(index))
            .markup(button.title.as_str()),
        |node, class| node.class(class),
    )
}

/// Offscreen element used to measure scrollbar width.
#[must_use]
pub fn scrollbar_probe() -> Node {
    Node::div()
        .key(NodeKey::Probe)
        .class(PROBE_CLASS)
        .overflow(Overflow::Scroll)
}

fn footer_node(footer: &FooterInput<'_>) -> Node {
    let mut body = Node::div().key(NodeKey::FooterBody).class(FOOTER_BODY_CLASS);
    if let Some(content) = footer.content {
        body = body.markup(content);
    }

    footer
        .buttons
        .iter()
        .enumerate()
        .fold(
            Node::div().key(NodeKey::Footer).class(FOOTER_CLASS).child(body),
            |footer, (index, button)| footer.child(footer_button(index, button)),
        )
}

/// Class tokens must be non-empty and free of whitespace.
fn is_class_token(class: &str) -> bool {
    !class.is_empty() && !class.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::Tag;

    fn input<'a>(
        classes: &'a [String],
        close_button: bool,
        footer: Option<FooterInput<'a>>,
    ) -> BuildInput<'a> {
        BuildInput {
            content: Content::Markup("<p>Hi</p>"),
            css_class: classes,
            close_button,
            footer,
        }
    }

    #[test]
    fn test_minimal_tree() {
        let tree = build(&input(&[], false, None));

        let expected = Node::div()
            .key(NodeKey::Backdrop)
            .class(BACKDROP_CLASS)
            .child(
                Node::div()
                    .key(NodeKey::Container)
                    .class(CONTAINER_CLASS)
                    .child(
                        Node::div()
                            .key(NodeKey::Content)
                            .class(CONTENT_CLASS)
                            .markup("<p>Hi</p>"),
                    ),
            );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_close_button_comes_before_content() {
        let tree = build(&input(&[], true, None));
        let container = tree.find(NodeKey::Container).unwrap();

        assert_eq!(container.children[0].key, Some(NodeKey::CloseButton));
        assert_eq!(container.children[0].tag, Tag::Button);
        assert_eq!(container.children[0].markup.as_deref(), Some(CLOSE_LABEL));
        assert_eq!(container.children[1].key, Some(NodeKey::Content));
    }

    #[test]
    fn test_invalid_classes_are_skipped() {
        let classes = vec![
            "wide".to_string(),
            String::new(),
            "two words".to_string(),
            "dark".to_string(),
        ];
        let tree = build(&input(&classes, false, None));
        let container = tree.find(NodeKey::Container).unwrap();

        assert_eq!(container.classes, vec![CONTAINER_CLASS, "wide", "dark"]);
    }

    #[test]
    fn test_footer_holds_body_then_buttons_in_order() {
        let buttons = vec![
            FooterButton::new("OK", "btn", |_| {}),
            FooterButton::new("Cancel", "btn btn--ghost", |_| {}),
        ];
        let footer = FooterInput {
            content: Some("<small>note</small>"),
            buttons: &buttons,
        };
        let tree = build(&input(&[], false, Some(footer)));
        let footer = tree.find(NodeKey::Footer).unwrap();

        assert_eq!(footer.children.len(), 3);
        assert_eq!(footer.children[0].markup.as_deref(), Some("<small>note</small>"));
        assert_eq!(footer.children[1].key, Some(NodeKey::FooterButton(0)));
        assert_eq!(footer.children[1].markup.as_deref(), Some("OK"));
        assert_eq!(footer.children[2].key, Some(NodeKey::FooterButton(1)));
        assert_eq!(footer.children[2].classes, vec!["btn", "btn--ghost"]);
    }

    #[test]
    fn test_template_content_is_nested() {
        let template = Node::fragment(vec![Node::div().markup("from template")]);
        let tree = build(&BuildInput {
            content: Content::Template(template.clone()),
            css_class: &[],
            close_button: false,
            footer: None,
        });

        let content = tree.find(NodeKey::Content).unwrap();
        assert_eq!(content.markup, None);
        assert_eq!(content.children, vec![template]);
    }
}
