/// The LSIF vertex/edge labels the transform acts on.
///
/// Dispatch is a closed enum rather than an open string switch; anything not
/// listed here maps to [`Label::Ignored`] so unused LSIF record kinds
/// (`resultSet`, `definitionResult`, monikers, ...) pass through without
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    MetaData,
    Document,
    Contains,
    Range,
    Item,
    HoverResult,
    /// `textDocument/hover` edge.
    HoverEdge,
    /// `textDocument/references` edge.
    ReferencesEdge,
    Ignored,
}

impl Label {
    pub fn parse(label: &str) -> Label {
        match label {
            "metaData" => Label::MetaData,
            "document" => Label::Document,
            "contains" => Label::Contains,
            "range" => Label::Range,
            "item" => Label::Item,
            "hoverResult" => Label::HoverResult,
            "textDocument/hover" => Label::HoverEdge,
            "textDocument/references" => Label::ReferencesEdge,
            _ => Label::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_are_ignored() {
        assert_eq!(Label::parse("resultSet"), Label::Ignored);
        assert_eq!(Label::parse(""), Label::Ignored);
        assert_eq!(Label::parse("textDocument/definition"), Label::Ignored);
    }

    #[test]
    fn recognized_labels_parse() {
        assert_eq!(Label::parse("metaData"), Label::MetaData);
        assert_eq!(Label::parse("textDocument/hover"), Label::HoverEdge);
    }
}
