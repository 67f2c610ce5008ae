//! Generic single-element lookup by tag name.

use crate::document::{ElementRef, ParsedDocument, text_of};

/// What to pull out of the matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldQuery<'q> {
    /// The element itself.
    Element,
    /// The value of the named attribute.
    Attribute(&'q str),
    /// The concatenated text content.
    Text,
}

/// A value extracted from a document.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    Element(ElementRef<'a>),
    Attribute(String),
    Text(String),
}

impl FieldValue<'_> {
    /// String form of the value; elements render as their outer markup.
    pub fn into_string(self) -> String {
        match self {
            FieldValue::Element(element) => element.html().to_string(),
            FieldValue::Attribute(value) | FieldValue::Text(value) => value,
        }
    }
}

/// Locate the first `tag` element and extract the requested part of it.
///
/// A missing element or attribute yields `None`; callers treat that as
/// "field unavailable". If several elements share the tag only the first is
/// considered.
pub fn extract_field<'a>(
    document: &'a ParsedDocument,
    tag: &str,
    query: FieldQuery<'_>,
) -> Option<FieldValue<'a>> {
    let element = document.find(tag)?;

    match query {
        FieldQuery::Element => Some(FieldValue::Element(element)),
        FieldQuery::Attribute(name) => element
            .attr(name)
            .map(|value| FieldValue::Attribute(value.to_string())),
        FieldQuery::Text => Some(FieldValue::Text(text_of(element))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<table id="rep-42"><caption>Quarterly report</caption>
        <thead><tr><th>A</th></tr></thead></table>"#;

    #[test]
    fn test_extract_attribute() {
        let doc = ParsedDocument::parse(DOC);
        let id = extract_field(&doc, "table", FieldQuery::Attribute("id")).map(FieldValue::into_string);
        assert_eq!(id.as_deref(), Some("rep-42"));
    }

    #[test]
    fn test_missing_attribute() {
        let doc = ParsedDocument::parse(DOC);
        assert!(extract_field(&doc, "table", FieldQuery::Attribute("data-ref")).is_none());
    }

    #[test]
    fn test_extract_text() {
        let doc = ParsedDocument::parse(DOC);
        let title = extract_field(&doc, "caption", FieldQuery::Text).map(FieldValue::into_string);
        assert_eq!(title.as_deref(), Some("Quarterly report"));
    }

    #[test]
    fn test_extract_element_markup() {
        let doc = ParsedDocument::parse(DOC);
        let header = extract_field(&doc, "thead", FieldQuery::Element)
            .map(FieldValue::into_string)
            .unwrap();
        assert_eq!(header, "<thead><tr><th>A</th></tr></thead>");
    }

    #[test]
    fn test_element_markup_is_not_normalized() {
        let doc = ParsedDocument::parse("<table id=t><tr><td>5</td></tr><tfoot><tr><td>x</td></tr></tfoot></table>");

        let table = extract_field(&doc, "table", FieldQuery::Element).map(FieldValue::into_string);
        assert_eq!(
            table.as_deref(),
            Some("<table id=t><tr><td>5</td></tr><tfoot><tr><td>x</td></tr></tfoot></table>")
        );
        assert!(extract_field(&doc, "tbody", FieldQuery::Element).is_none());
    }

    #[test]
    fn test_missing_tag() {
        let doc = ParsedDocument::parse(DOC);
        assert!(extract_field(&doc, "tfoot", FieldQuery::Element).is_none());
        assert!(extract_field(&doc, "tfoot", FieldQuery::Text).is_none());
    }
}
