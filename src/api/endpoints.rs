//! Per-kind record endpoints.
//!
//! Each module binds a [`RecordKind`] to the generic handlers and carries the
//! OpenAPI annotations for its paths.

use crate::store::RecordKind;

macro_rules! record_endpoints {
    ($module:ident, $kind:expr, $tag:tt, $item:tt, $list:tt) => {
        /// Endpoints for one record kind.
        pub mod $module {
            use axum::extract::State;
            use axum::routing::get;
            use axum::{Json, Router};

            use crate::api::extract::{ApiBody, ApiQuery};
            use crate::api::handlers::{
                self, AppState, MessageView, RecordForm, RecordListView, RecordQuery, RecordUpdate,
                RecordView,
            };
            use crate::error::{ApiError, ErrorBody};

            use super::RecordKind;

            /// Kind served by this module.
            pub const KIND: RecordKind = $kind;

            /// Routes for this kind.
            pub fn router() -> Router<AppState> {
                Router::new()
                    .route(
                        $item,
                        get(fetch).post(create).put(update).delete(delete),
                    )
                    .route($list, get(list))
            }

            /// Resolve a CEP and store a new record.
            ///
            /// The body may be JSON or `application/x-www-form-urlencoded`.
            #[utoipa::path(
                post,
                path = $item,
                tag = $tag,
                operation_id = concat!("create_", stringify!($module)),
                request_body = RecordForm,
                responses(
                    (status = 200, description = "Registro criado", body = RecordView),
                    (status = 400, description = "CEP inválido ou falha ao salvar", body = ErrorBody),
                    (status = 409, description = "Registro duplicado", body = ErrorBody),
                    (status = 500, description = "Falha ao consultar o CEP", body = ErrorBody)
                )
            )]
            pub async fn create(
                state: State<AppState>,
                form: ApiBody<RecordForm>,
            ) -> Result<Json<RecordView>, ApiError> {
                handlers::create_record(KIND, state, form).await
            }

            /// Fetch a record by id.
            #[utoipa::path(
                get,
                path = $item,
                tag = $tag,
                operation_id = concat!("fetch_", stringify!($module)),
                params(RecordQuery),
                responses(
                    (status = 200, description = "Registro encontrado", body = RecordView),
                    (status = 400, description = "Registro não encontrado", body = ErrorBody)
                )
            )]
            pub async fn fetch(
                state: State<AppState>,
                query: ApiQuery<RecordQuery>,
            ) -> Result<Json<RecordView>, ApiError> {
                handlers::fetch_record(KIND, state, query).await
            }

            /// List every record.
            #[utoipa::path(
                get,
                path = $list,
                tag = $tag,
                operation_id = concat!("list_", stringify!($module)),
                responses(
                    (status = 200, description = "Todos os registros", body = RecordListView),
                    (status = 400, description = "Nenhum registro na base", body = ErrorBody)
                )
            )]
            pub async fn list(state: State<AppState>) -> Result<Json<RecordListView>, ApiError> {
                handlers::list_records(KIND, state).await
            }

            /// Delete a record by id.
            #[utoipa::path(
                delete,
                path = $item,
                tag = $tag,
                operation_id = concat!("delete_", stringify!($module)),
                params(RecordQuery),
                responses(
                    (status = 200, description = "Registro removido", body = MessageView),
                    (status = 400, description = "Registro não encontrado", body = ErrorBody)
                )
            )]
            pub async fn delete(
                state: State<AppState>,
                query: ApiQuery<RecordQuery>,
            ) -> Result<Json<MessageView>, ApiError> {
                handlers::delete_record(KIND, state, query).await
            }

            /// Update a record; a new CEP re-resolves the address.
            ///
            /// The body may be JSON or `application/x-www-form-urlencoded`.
            #[utoipa::path(
                put,
                path = $item,
                tag = $tag,
                operation_id = concat!("update_", stringify!($module)),
                request_body = RecordUpdate,
                responses(
                    (status = 200, description = "Registro atualizado", body = MessageView),
                    (status = 400, description = "CEP inválido ou não encontrado", body = ErrorBody),
                    (status = 404, description = "Registro não encontrado", body = ErrorBody),
                    (status = 500, description = "Falha ao atualizar", body = ErrorBody)
                )
            )]
            pub async fn update(
                state: State<AppState>,
                form: ApiBody<RecordUpdate>,
            ) -> Result<Json<MessageView>, ApiError> {
                handlers::update_record(KIND, state, form).await
            }
        }
    };
}

record_endpoints!(cliente, RecordKind::Cliente, "Cliente", "/cliente", "/clientes");
record_endpoints!(endereco, RecordKind::Endereco, "Endereco", "/endereco", "/enderecos");
