use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::error::FieldError;
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, model as auth_model};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::todos::{dtos as todos_dtos, handlers as todos_handlers};
use crate::shared::types::{ErrorResponse, PageMeta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::get_profile,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Todos
        todos_handlers::list_todos,
        todos_handlers::get_todo,
        todos_handlers::create_todo,
        todos_handlers::update_todo,
        todos_handlers::toggle_todo,
        todos_handlers::delete_todo,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            FieldError,
            PageMeta,
            // Auth
            auth_model::UserRole,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::UserResponseDto,
            auth_dtos::RegisterResponseDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::ProfileResponseDto,
            // Categories
            categories_dtos::CategoryBodyDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryListResponseDto,
            categories_dtos::CategoryDetailResponseDto,
            categories_dtos::CategoryMessageResponseDto,
            // Todos
            todos_dtos::CreateTodoDto,
            todos_dtos::UpdateTodoDto,
            todos_dtos::CategoryBriefDto,
            todos_dtos::UserBriefDto,
            todos_dtos::TodoResponseDto,
            todos_dtos::TodoListResponseDto,
            todos_dtos::TodoDetailResponseDto,
            todos_dtos::TodoMessageResponseDto,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "categories", description = "Shared todo categories"),
        (name = "todos", description = "Per-user todos with filtering, sorting and pagination"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Todo API",
        version = "0.1.0",
        description = "API documentation for the todo backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
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
