mod document_dto;

pub use document_dto::{
    sort_column, sort_direction, BulkDeleteDto, DocumentResponseDto, SearchQuery,
    UpdateDocumentDto,
};
