/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Name of the session cookie carrying the signed token
pub const SESSION_COOKIE: &str = "token";

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum document upload size in bytes (10MB)
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum avatar upload size in bytes (3MB)
pub const MAX_AVATAR_SIZE: usize = 3 * 1024 * 1024;

/// MIME types accepted for document uploads
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
];

/// MIME types accepted for avatar uploads
pub const ALLOWED_AVATAR_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_types_are_a_subset_of_document_types() {
        for ty in ALLOWED_AVATAR_TYPES {
            assert!(ALLOWED_DOCUMENT_TYPES.contains(ty));
        }
    }

    #[test]
    fn executables_are_not_accepted() {
        assert!(!ALLOWED_DOCUMENT_TYPES.contains(&"application/x-msdownload"));
        assert!(!ALLOWED_AVATAR_TYPES.contains(&"application/pdf"));
    }
}
