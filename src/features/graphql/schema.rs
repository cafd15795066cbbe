use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, InputObject, MaybeUndefined, Object,
    Schema,
};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::AuthService;
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::CategoryService;
use crate::features::auth::dtos::UserResponseDto;
use crate::features::todos::dtos::{TodoListResponseDto, TodoResponseDto};
use crate::features::todos::payload::{NormalizeMode, TodoInput};
use crate::features::todos::query::{TodoQuery, TodoQueryParams};
use crate::features::todos::TodoService;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// The resolved caller, if the request carried a valid bearer token.
/// Unlike the REST middleware, resolution failure is deferred to the
/// first field that actually requires authentication.
#[derive(Debug, Clone)]
pub struct Principal(pub Option<AuthenticatedUser>);

pub fn build_schema(
    auth: Arc<AuthService>,
    categories: Arc<CategoryService>,
    todos: Arc<TodoService>,
) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(auth)
        .data(categories)
        .data(todos)
        .finish()
}

fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a AuthenticatedUser, Error> {
    ctx.data_opt::<Principal>()
        .and_then(|p| p.0.as_ref())
        .ok_or_else(|| graphql_error(AppError::Unauthorized("Authentication required".to_string())))
}

/// Wire-level error code and HTTP-equivalent status for each error
/// class. Conflicts surface as bad user input with their own status.
fn error_code(err: &AppError) -> (&'static str, u16) {
    match err {
        AppError::Unauthorized(_) => ("UNAUTHENTICATED", 401),
        AppError::Forbidden(_) => ("FORBIDDEN", 403),
        AppError::NotFound(_) => ("NOT_FOUND", 404),
        AppError::Validation(_) | AppError::BadRequest(_) => ("BAD_USER_INPUT", 400),
        AppError::Conflict { .. } => ("BAD_USER_INPUT", 409),
        AppError::Database(_) | AppError::Internal(_) => ("INTERNAL_SERVER_ERROR", 500),
    }
}

fn graphql_error(err: AppError) -> Error {
    if err.should_report() {
        tracing::error!(report = true, "{}", err);
    }

    let (code, status) = error_code(&err);
    let details = err.details();

    Error::new(err.public_message()).extend_with(|_, e| {
        e.set("code", code);
        e.set("statusCode", status);
        if let Some(details) = &details {
            if let Ok(value) = serde_json::to_value(details)
                .map_err(|_| ())
                .and_then(|v| async_graphql::Value::from_json(v).map_err(|_| ()))
            {
                e.set("details", value);
            }
        }
    })
}

fn double_option<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(v) => Some(Some(v)),
    }
}

#[derive(Debug, InputObject)]
pub struct AddTodoInput {
    pub title: String,
    pub category_id: Option<i32>,
    /// ISO-8601 timestamp
    pub due_date: Option<String>,
}

impl From<AddTodoInput> for TodoInput {
    fn from(input: AddTodoInput) -> Self {
        Self {
            title: Some(input.title),
            completed: None,
            category_id: input.category_id.map(Some),
            due_date: input.due_date.map(Some),
        }
    }
}

/// Partial update input. Passing `null` for `categoryId` or
/// `dueDate` clears the stored value; omitting them leaves them
/// untouched.
#[derive(Debug, InputObject)]
pub struct UpdateTodoInput {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub category_id: MaybeUndefined<i32>,
    /// ISO-8601 timestamp
    pub due_date: MaybeUndefined<String>,
}

impl From<UpdateTodoInput> for TodoInput {
    fn from(input: UpdateTodoInput) -> Self {
        Self {
            title: input.title,
            completed: input.completed,
            category_id: double_option(input.category_id),
            due_date: double_option(input.due_date),
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated caller's profile
    async fn me(&self, ctx: &Context<'_>) -> Result<UserResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let auth = ctx.data_unchecked::<Arc<AuthService>>();

        auth.profile(principal.id).await.map_err(graphql_error)
    }

    /// All categories, newest first
    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<CategoryResponseDto>, Error> {
        require_auth(ctx)?;
        let categories = ctx.data_unchecked::<Arc<CategoryService>>();

        let all = categories.list().await.map_err(graphql_error)?;
        Ok(all.into_iter().map(Into::into).collect())
    }

    /// A page of the caller's todos. Unrecognized sort, order, page
    /// or limit values fall back to defaults instead of erroring.
    #[allow(clippy::too_many_arguments)]
    async fn todos(
        &self,
        ctx: &Context<'_>,
        completed: Option<bool>,
        category: Option<i32>,
        search: Option<String>,
        sort: Option<String>,
        order: Option<String>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<TodoListResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let todos = ctx.data_unchecked::<Arc<TodoService>>();

        let params = TodoQueryParams {
            completed,
            category,
            search,
            sort,
            order,
            page,
            limit,
        };
        let query = TodoQuery::shape(params, principal).map_err(graphql_error)?;
        let (records, meta) = todos.list(&query).await.map_err(graphql_error)?;

        Ok(TodoListResponseDto {
            data: records.into_iter().map(Into::into).collect(),
            meta,
        })
    }

    /// A single todo by id
    async fn todo(&self, ctx: &Context<'_>, id: Uuid) -> Result<TodoResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let todos = ctx.data_unchecked::<Arc<TodoService>>();

        let record = todos.get(id, principal).await.map_err(graphql_error)?;
        Ok(record.into())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a todo owned by the caller
    async fn add_todo(
        &self,
        ctx: &Context<'_>,
        input: AddTodoInput,
    ) -> Result<TodoResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let todos = ctx.data_unchecked::<Arc<TodoService>>();

        let changes = TodoInput::from(input)
            .normalize(NormalizeMode::Full)
            .map_err(graphql_error)?;
        let record = todos
            .create(principal, changes)
            .await
            .map_err(graphql_error)?;

        Ok(record.into())
    }

    /// Partially update a todo
    async fn update_todo(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateTodoInput,
    ) -> Result<TodoResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let todos = ctx.data_unchecked::<Arc<TodoService>>();

        // Existence and ownership are settled before the payload is
        // inspected, so probing someone else's todo with a bad
        // payload still yields Forbidden.
        todos.get(id, principal).await.map_err(graphql_error)?;

        let changes = TodoInput::from(input)
            .normalize(NormalizeMode::Partial)
            .map_err(graphql_error)?;
        let record = todos
            .update(id, principal, changes)
            .await
            .map_err(graphql_error)?;

        Ok(record.into())
    }

    /// Flip a todo's completion state
    async fn toggle_todo(&self, ctx: &Context<'_>, id: Uuid) -> Result<TodoResponseDto, Error> {
        let principal = require_auth(ctx)?;
        let todos = ctx.data_unchecked::<Arc<TodoService>>();

        let record = todos.toggle(id, principal).await.map_err(graphql_error)?;
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FieldError;

    #[test]
    fn error_codes_mirror_the_http_taxonomy() {
        assert_eq!(
            error_code(&AppError::Unauthorized("x".into())),
            ("UNAUTHENTICATED", 401)
        );
        assert_eq!(
            error_code(&AppError::Forbidden("x".into())),
            ("FORBIDDEN", 403)
        );
        assert_eq!(
            error_code(&AppError::NotFound("x".into())),
            ("NOT_FOUND", 404)
        );
        assert_eq!(
            error_code(&AppError::Validation(vec![])),
            ("BAD_USER_INPUT", 400)
        );
        assert_eq!(
            error_code(&AppError::Internal("x".into())),
            ("INTERNAL_SERVER_ERROR", 500)
        );
    }

    #[test]
    fn conflicts_are_bad_user_input_with_their_own_status() {
        let err = AppError::Conflict {
            message: "Duplicate data".into(),
            details: vec![],
        };
        assert_eq!(error_code(&err), ("BAD_USER_INPUT", 409));
    }

    #[test]
    fn internal_messages_stay_hidden_in_the_graphql_envelope() {
        let err = graphql_error(AppError::Internal("pool exhausted".into()));
        assert_eq!(err.message, "Internal server error");

        let err = graphql_error(AppError::Validation(vec![FieldError::new(
            "title",
            "Title is required",
        )]));
        assert_eq!(err.message, "Validation failed");
    }

    #[test]
    fn maybe_undefined_maps_onto_nested_options() {
        assert_eq!(double_option(MaybeUndefined::<i32>::Undefined), None);
        assert_eq!(double_option(MaybeUndefined::<i32>::Null), Some(None));
        assert_eq!(double_option(MaybeUndefined::Value(3)), Some(Some(3)));
    }

    #[test]
    fn field_details_ride_in_the_details_extension() {
        let err = graphql_error(AppError::Validation(vec![FieldError::new(
            "title",
            "Title is required",
        )]));
        let server_err = err.into_server_error(async_graphql::Pos { line: 0, column: 0 });

        let json = serde_json::to_value(&server_err).unwrap();
        assert_eq!(json["extensions"]["code"], "BAD_USER_INPUT");
        assert_eq!(json["extensions"]["details"][0]["field"], "title");
        assert_eq!(json["extensions"]["details"][0]["message"], "Title is required");
    }

    // Schema backed by a pool that can never connect; resolvers that
    // fail before touching storage are fully testable, and a storage
    // touch surfaces as a 500-class error within the acquire timeout.
    fn unreachable_schema() -> AppSchema {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(250))
            .connect_lazy("postgres://localhost:1/unused")
            .unwrap();
        let tokens = Arc::new(crate::features::auth::TokenService::new(
            &crate::core::config::AuthConfig {
                jwt_secret: "test-secret".to_string(),
                jwt_expires_in_secs: 3600,
            },
        ));
        let auth = Arc::new(AuthService::new(pool.clone(), tokens));
        let categories = Arc::new(CategoryService::new(pool.clone()));
        let todos = Arc::new(TodoService::new(pool, Arc::clone(&categories)));
        build_schema(auth, categories, todos)
    }

    #[tokio::test]
    async fn fields_without_a_principal_fail_with_unauthenticated() {
        let response = unreachable_schema()
            .execute(async_graphql::Request::new("{ me { id } }"))
            .await;

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
        assert_eq!(json["errors"][0]["extensions"]["statusCode"], 401);
    }

    #[tokio::test]
    async fn update_todo_looks_up_the_todo_before_reading_the_payload() {
        use crate::shared::test_helpers::user_principal;

        // The title below would fail payload checks; because the
        // lookup runs first, the unreachable storage error surfaces
        // instead of BAD_USER_INPUT.
        let query = r#"mutation {
            updateTodo(id: "7f8a1f6e-2f6c-4d5b-9a57-0c3a2f1e9b10", input: { title: "x" }) { id }
        }"#;
        let request =
            async_graphql::Request::new(query).data(Principal(Some(user_principal(7))));
        let response = unreachable_schema().execute(request).await;

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["errors"][0]["extensions"]["code"],
            "INTERNAL_SERVER_ERROR"
        );
    }
}
