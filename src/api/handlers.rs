//! HTTP API handlers.
//!
//! Record handlers take the [`RecordKind`] as their first argument; the
//! per-kind endpoints in [`super::endpoints`] bind it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::{ApiError, ErrorBody, LookupError, StoreError};
use crate::lookup::{AddressFields, Cep, CepLookup};
use crate::metrics;
use crate::store::{Record, RecordKind, RecordStore};

use super::extract::{ApiBody, ApiQuery};

/// Message returned whenever a CEP cannot be resolved.
pub const INVALID_CEP: &str = "CEP inválido ou não encontrado";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store.
    pub store: RecordStore,
    /// CEP provider.
    pub lookup: Arc<dyn CepLookup>,
    /// Prometheus handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: RecordStore, lookup: Arc<dyn CepLookup>) -> Self {
        Self {
            store,
            lookup,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordView {
    /// Record identifier.
    #[schema(example = 1)]
    pub id: i64,
    /// CEP, eight digits.
    #[schema(example = "21240050")]
    pub cep: String,
    /// Street.
    #[serde(rename = "endereco")]
    pub street: Option<String>,
    /// Neighborhood.
    #[serde(rename = "bairro")]
    pub neighborhood: Option<String>,
    /// City.
    #[serde(rename = "localidade")]
    #[schema(example = "Rio de Janeiro")]
    pub city: Option<String>,
    /// State.
    #[serde(rename = "uf")]
    #[schema(example = "RJ")]
    pub state: Option<String>,
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            cep: record.cep,
            street: record.street,
            neighborhood: record.neighborhood,
            city: record.city,
            state: record.state,
        }
    }
}

/// List response, keyed by the kind's plural.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RecordListView {
    /// `GET /clientes`.
    Clientes {
        /// Every cliente.
        clientes: Vec<RecordView>,
    },
    /// `GET /enderecos`.
    Enderecos {
        /// Every endereco.
        enderecos: Vec<RecordView>,
    },
}

impl RecordListView {
    fn new(kind: RecordKind, records: Vec<Record>) -> Self {
        let views = records.into_iter().map(RecordView::from).collect();
        match kind {
            RecordKind::Cliente => RecordListView::Clientes { clientes: views },
            RecordKind::Endereco => RecordListView::Enderecos { enderecos: views },
        }
    }
}

/// Confirmation for delete and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageView {
    /// Confirmation text.
    pub message: String,
    /// Affected record.
    pub id: i64,
}

/// Create request. Address fields are accepted but replaced by the lookup.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordForm {
    /// CEP to resolve.
    #[schema(example = "21240050")]
    pub cep: String,
    /// Ignored.
    #[serde(default)]
    pub endereco: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub bairro: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub localidade: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub uf: Option<String>,
}

/// Update request. Only a changed `cep` has an effect.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordUpdate {
    /// Record to update.
    #[serde(default = "default_id")]
    pub id: i64,
    /// New CEP; empty or absent leaves the record untouched.
    #[serde(default)]
    pub cep: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub endereco: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub bairro: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub localidade: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub uf: Option<String>,
}

/// `?id=` query for fetch and delete.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordQuery {
    /// Record identifier (defaults to 1).
    #[serde(default = "default_id")]
    pub id: i64,
}

/// `?cep=` query for the raw consult.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConsultQuery {
    /// CEP to consult.
    pub cep: Option<String>,
}

fn default_id() -> i64 {
    1
}

fn not_in_base(kind: RecordKind) -> String {
    format!("{} não encontrado na base :/", kind.label())
}

fn storage_failure(kind: RecordKind, err: StoreError) -> ApiError {
    error!(kind = %kind, "Store failure: {}", err);
    ApiError::internal(format!("Erro ao acessar a base de {}: {}", kind.list_key(), err))
}

fn lookup_failure(err: LookupError) -> ApiError {
    error!("CEP lookup failed: {}", err);
    ApiError::internal(format!("Erro ao consultar o CEP: {}", err))
}

/// Resolve a CEP; `None` when the provider does not know it.
async fn resolve(state: &AppState, cep: &Cep) -> Result<Option<AddressFields>, LookupError> {
    Ok(state.lookup.lookup(cep).await?.into_fields())
}

/// Create a record from a CEP.
pub async fn create_record(
    kind: RecordKind,
    State(state): State<AppState>,
    ApiBody(form): ApiBody<RecordForm>,
) -> Result<Json<RecordView>, ApiError> {
    let cep = Cep::parse(&form.cep).map_err(|_| {
        warn!(kind = %kind, cep = %form.cep, "Malformed CEP");
        ApiError::bad_request(INVALID_CEP)
    })?;

    debug!(kind = %kind, cep = %cep, "Adding record");

    let address = match resolve(&state, &cep).await {
        Ok(Some(address)) => address,
        Ok(None) => {
            warn!(kind = %kind, cep = %cep, "CEP not found by provider");
            return Err(ApiError::bad_request(INVALID_CEP));
        }
        Err(e) => return Err(lookup_failure(e)),
    };

    match state.store.insert(kind, &cep, &address).await {
        Ok(created) => {
            metrics::inc_record_writes(kind, "create");
            debug!(kind = %kind, id = created.id, "Record added");
            Ok(Json(created.into()))
        }
        Err(StoreError::Duplicate { .. }) => {
            let message = format!("{} de mesmo nome já salvo na base :/", kind.label());
            warn!(kind = %kind, cep = %cep, "Error adding record, {}", message);
            Err(ApiError::conflict(message))
        }
        Err(e) => {
            let message = "Não foi possível salvar novo item :/";
            warn!(kind = %kind, cep = %cep, error = %e, "Error adding record, {}", message);
            Err(ApiError::bad_request(message))
        }
    }
}

/// Fetch one record by id.
pub async fn fetch_record(
    kind: RecordKind,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> Result<Json<RecordView>, ApiError> {
    debug!(kind = %kind, id = query.id, "Fetching record");

    match state.store.fetch(kind, query.id).await {
        Ok(Some(found)) => Ok(Json(found.into())),
        Ok(None) => {
            let message = not_in_base(kind);
            warn!(kind = %kind, id = query.id, "Error fetching record, {}", message);
            Err(ApiError::bad_request(message))
        }
        Err(e) => Err(storage_failure(kind, e)),
    }
}

/// List every record of a kind. An empty table is reported as an error.
pub async fn list_records(
    kind: RecordKind,
    State(state): State<AppState>,
) -> Result<Json<RecordListView>, ApiError> {
    debug!(kind = %kind, "Listing records");

    let records = state
        .store
        .list(kind)
        .await
        .map_err(|e| storage_failure(kind, e))?;

    if records.is_empty() {
        let message = not_in_base(kind);
        warn!(kind = %kind, "Error listing records, {}", message);
        return Err(ApiError::bad_request(message));
    }

    Ok(Json(RecordListView::new(kind, records)))
}

/// Delete one record by id.
pub async fn delete_record(
    kind: RecordKind,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> Result<Json<MessageView>, ApiError> {
    debug!(kind = %kind, id = query.id, "Deleting record");

    let removed = state
        .store
        .delete(kind, query.id)
        .await
        .map_err(|e| storage_failure(kind, e))?;

    if removed == 0 {
        let message = not_in_base(kind);
        warn!(kind = %kind, id = query.id, "Error deleting record, {}", message);
        return Err(ApiError::bad_request(message));
    }

    metrics::inc_record_writes(kind, "delete");
    debug!(kind = %kind, id = query.id, "Record deleted");
    Ok(Json(MessageView {
        message: format!("{} removido", kind.label()),
        id: query.id,
    }))
}

/// Update a record, re-resolving the address when the CEP changes.
///
/// No database connection is held while the provider is consulted; the
/// overwrite runs in its own short transaction.
pub async fn update_record(
    kind: RecordKind,
    State(state): State<AppState>,
    ApiBody(form): ApiBody<RecordUpdate>,
) -> Result<Json<MessageView>, ApiError> {
    let id = form.id;
    debug!(kind = %kind, id, "Updating record");

    let failed = |e: &dyn std::fmt::Display| {
        let message = format!("Erro ao atualizar {}: {}", kind.label(), e);
        error!(kind = %kind, id, "{}", message);
        ApiError::internal(message)
    };

    let missing = || {
        let message = format!("{} com ID {} não encontrado.", kind.title(), id);
        warn!(kind = %kind, id, "Error updating record, {}", message);
        ApiError::not_found(message)
    };

    let current = state
        .store
        .fetch(kind, id)
        .await
        .map_err(|e| failed(&e))?
        .ok_or_else(missing)?;

    let requested = form.cep.as_deref().map(str::trim).filter(|c| !c.is_empty());
    if let Some(raw) = requested {
        let cep = Cep::parse(raw).map_err(|_| {
            warn!(kind = %kind, id, cep = %raw, "Malformed CEP");
            ApiError::bad_request(INVALID_CEP)
        })?;

        if cep.as_str() != current.cep {
            let address = match resolve(&state, &cep).await {
                Ok(Some(address)) => address,
                Ok(None) => {
                    warn!(kind = %kind, id, cep = %cep, "CEP not found by provider");
                    return Err(ApiError::bad_request(INVALID_CEP));
                }
                Err(e) => return Err(failed(&e)),
            };

            let changed = state
                .store
                .overwrite_address(kind, id, &cep, &address)
                .await
                .map_err(|e| failed(&e))?;
            if changed == 0 {
                return Err(missing());
            }
        }
    }

    metrics::inc_record_writes(kind, "update");
    debug!(kind = %kind, id, "Record updated");
    Ok(Json(MessageView {
        message: format!("{} atualizado", kind.title()),
        id,
    }))
}

/// Raw provider response for a CEP.
#[utoipa::path(
    get,
    path = "/consulta-cep",
    tag = "CEP",
    params(ConsultQuery),
    responses(
        (status = 200, description = "Resposta do provedor de CEP"),
        (status = 400, description = "CEP ausente ou malformado", body = ErrorBody),
        (status = 500, description = "Falha de rede ao consultar o provedor", body = ErrorBody)
    )
)]
pub async fn consult_cep(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ConsultQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = query
        .cep
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("O parâmetro 'cep' é obrigatório"))?;

    let cep = Cep::parse(raw).map_err(|_| ApiError::bad_request(INVALID_CEP))?;

    state
        .lookup
        .consult(&cep)
        .await
        .map(Json)
        .map_err(lookup_failure)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Send browsers to the API document.
pub async fn home() -> Redirect {
    Redirect::to("/openapi")
}

/// OpenAPI document.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(super::ApiDoc::openapi())
}

/// Prometheus exposition, 404 when metrics are disabled.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
