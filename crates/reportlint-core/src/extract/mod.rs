//! Field extraction from parsed report documents.

mod assembler;
pub mod footer;
pub mod patterns;
pub mod tags;

pub use assembler::RecordAssembler;
pub use footer::{FooterFacts, FooterPattern, extract_date_and_country, format_canonical, parse_date};
pub use tags::{FieldQuery, FieldValue, extract_field};
