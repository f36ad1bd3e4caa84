use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Every audited action in the system. Stored as plain text so the audit
/// trail survives code changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    UploadDocument,
    DownloadDocument,
    UpdateDocument,
    DeleteDocument,
    CreateUser,
    UpdateUserRole,
    ToggleUserStatus,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UploadDocument => "UPLOAD_DOCUMENT",
            Self::DownloadDocument => "DOWNLOAD_DOCUMENT",
            Self::UpdateDocument => "UPDATE_DOCUMENT",
            Self::DeleteDocument => "DELETE_DOCUMENT",
            Self::CreateUser => "CREATE_USER",
            Self::UpdateUserRole => "UPDATE_USER_ROLE",
            Self::ToggleUserStatus => "TOGGLE_USER_STATUS",
        }
    }
}

/// Audit row joined with actor and (when still present) document names,
/// as served to the monitoring page.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogWithRelations {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_id: Option<Uuid>,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub document_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_stable() {
        assert_eq!(ActivityAction::UploadDocument.as_str(), "UPLOAD_DOCUMENT");
        assert_eq!(ActivityAction::DeleteDocument.as_str(), "DELETE_DOCUMENT");
        assert_eq!(ActivityAction::UpdateUserRole.as_str(), "UPDATE_USER_ROLE");
        assert_eq!(
            ActivityAction::ToggleUserStatus.as_str(),
            "TOGGLE_USER_STATUS"
        );
    }
}
