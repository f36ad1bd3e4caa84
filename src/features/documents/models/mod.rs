mod document;

pub use document::{Document, DocumentWithRelations};
