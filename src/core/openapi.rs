use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::activity::{dtos as activity_dtos, handlers as activity_handlers};
use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::features::folders::{dtos as folders_dtos, handlers as folders_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models::Role};
use crate::shared::constants::SESSION_COOKIE;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Documents
        documents_handlers::upload_document,
        documents_handlers::search_documents,
        documents_handlers::download_document,
        documents_handlers::update_document,
        documents_handlers::delete_document,
        documents_handlers::bulk_delete,
        // Folders
        folders_handlers::list_folders,
        folders_handlers::create_folder,
        folders_handlers::update_folder,
        folders_handlers::delete_folder,
        folders_handlers::download_folder,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::update_user,
        users_handlers::update_avatar,
        // Dashboard
        dashboard_handlers::get_dashboard,
        // Activity / monitoring
        activity_handlers::list_activity,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Role,
            ApiResponse<String>,
            // Auth
            auth::model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthUserDto,
            ApiResponse<auth_dtos::AuthUserDto>,
            ApiResponse<auth::model::AuthenticatedUser>,
            // Documents
            documents_dtos::DocumentResponseDto,
            documents_dtos::UpdateDocumentDto,
            documents_dtos::BulkDeleteDto,
            ApiResponse<documents_dtos::DocumentResponseDto>,
            ApiResponse<Vec<documents_dtos::DocumentResponseDto>>,
            // Folders
            folders_dtos::CreateFolderDto,
            folders_dtos::UpdateFolderDto,
            folders_dtos::FolderResponseDto,
            ApiResponse<folders_dtos::FolderResponseDto>,
            ApiResponse<Vec<folders_dtos::FolderResponseDto>>,
            // Users
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Dashboard
            dashboard_dtos::FileTypeCountDto,
            dashboard_dtos::DashboardStatsDto,
            ApiResponse<dashboard_dtos::DashboardStatsDto>,
            // Activity
            activity_dtos::ActivityResponseDto,
            ApiResponse<Vec<activity_dtos::ActivityResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Session management"),
        (name = "documents", description = "Document upload, search and download"),
        (name = "folders", description = "Folder management and zip downloads"),
        (name = "users", description = "User management (super admin) and profile"),
        (name = "dashboard", description = "Dashboard statistics"),
        (name = "activity", description = "Audit trail (super admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "DokuPort API",
        version = "0.1.0",
        description = "Role-gated document management API",
    )
)]
pub struct ApiDoc;

/// Overrides the OpenAPI info block from configuration.
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

/// Adds the session-cookie security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}
