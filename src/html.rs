use scraper::{ElementRef, Html, Node, Selector};

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid built-in selector {css:?}: {err}"))
}

/// Text content of `element` with runs of whitespace collapsed to one space.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text nodes a browser would render, in document order.
pub(crate) fn visible_text_nodes(document: &Html) -> impl Iterator<Item = &str> {
    document.root_element().descendants().filter_map(|node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if hidden {
            return None;
        }
        Some(&**text)
    })
}

pub(crate) fn visible_text(document: &Html) -> String {
    visible_text_nodes(document).collect::<Vec<_>>().join(" ")
}
