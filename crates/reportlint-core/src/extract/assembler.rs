//! Canonical record assembly.

use tracing::debug;

use super::footer::FooterPattern;
use super::tags::{FieldQuery, FieldValue, extract_field};
use crate::document::{ParsedDocument, text_of};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::CanonicalRecord;

/// Builds one [`CanonicalRecord`] per parsed document.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    id_tag: String,
    id_attribute: String,
    title_tag: String,
    head_tag: String,
    body_tag: String,
    footer_tag: String,
    /// `None` when footer date/country extraction is disabled.
    footer_pattern: Option<FooterPattern>,
}

impl RecordAssembler {
    /// Create an assembler, compiling the footer pattern up front.
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let footer_pattern = if config.extract_country_and_date_from_footer {
            Some(FooterPattern::new(&config.country_date_regex, config.date_format.clone())?)
        } else {
            None
        };

        Ok(Self {
            id_tag: config.id_tag.clone(),
            id_attribute: config.id_attribute.clone(),
            title_tag: config.title_tag.clone(),
            head_tag: config.head_tag.clone(),
            body_tag: config.body_tag.clone(),
            footer_tag: config.footer_tag.clone(),
            footer_pattern,
        })
    }

    /// Extract the canonical record.
    ///
    /// Missing elements never fail the assembly: optional fields become
    /// `None` and missing containers become empty markup.
    pub fn assemble(&self, document: &ParsedDocument) -> CanonicalRecord {
        let document_id = extract_field(document, &self.id_tag, FieldQuery::Attribute(&self.id_attribute))
            .map(FieldValue::into_string);
        let title = extract_field(document, &self.title_tag, FieldQuery::Text).map(FieldValue::into_string);
        let header = self.markup(document, &self.head_tag);
        let body = self.markup(document, &self.body_tag);
        let footer = self.markup(document, &self.footer_tag);

        let (country, creation_date) = match (&self.footer_pattern, document.find(&self.footer_tag)) {
            (Some(pattern), Some(footer)) => {
                let facts = pattern.extract(&text_of(footer));
                (facts.country, facts.creation_date)
            }
            _ => (None, None),
        };

        debug!(
            "Assembled record id={:?} country={:?} creation_date={:?}",
            document_id, country, creation_date
        );

        CanonicalRecord {
            document_id,
            title,
            header,
            body,
            footer,
            creation_date,
            country,
        }
    }

    fn markup(&self, document: &ParsedDocument, tag: &str) -> String {
        extract_field(document, tag, FieldQuery::Element)
            .map(FieldValue::into_string)
            .unwrap_or_default()
    }
}

impl Default for RecordAssembler {
    fn default() -> Self {
        let config = ExtractionConfig::default();
        Self {
            id_tag: config.id_tag,
            id_attribute: config.id_attribute,
            title_tag: config.title_tag,
            head_tag: config.head_tag,
            body_tag: config.body_tag,
            footer_tag: config.footer_tag,
            footer_pattern: Some(FooterPattern::default()),
        }
    }
}
