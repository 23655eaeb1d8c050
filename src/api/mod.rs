//! HTTP API module: record CRUD, CEP consult, docs, health and metrics.

pub mod endpoints;
pub mod extract;
pub mod handlers;
pub mod routes;

use utoipa::OpenApi;

use crate::error::ErrorBody;
use handlers::{MessageView, RecordForm, RecordListView, RecordUpdate, RecordView};

pub use handlers::AppState;
pub use routes::create_router;

/// OpenAPI document served at `/openapi`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cadastro CEP",
        version = "1.0.0",
        description = "Cadastro de clientes e endereços enriquecidos pela consulta de CEP"
    ),
    paths(
        endpoints::cliente::create,
        endpoints::cliente::fetch,
        endpoints::cliente::list,
        endpoints::cliente::delete,
        endpoints::cliente::update,
        endpoints::endereco::create,
        endpoints::endereco::fetch,
        endpoints::endereco::list,
        endpoints::endereco::delete,
        endpoints::endereco::update,
        handlers::consult_cep
    ),
    components(schemas(
        RecordView,
        RecordListView,
        RecordForm,
        RecordUpdate,
        MessageView,
        ErrorBody
    )),
    tags(
        (name = "Cliente", description = "Adição, visualização, atualização e remoção de clientes da base"),
        (name = "Endereco", description = "Adição, visualização, atualização e remoção de endereços da base"),
        (name = "CEP", description = "Consulta direta ao provedor de CEP")
    )
)]
pub struct ApiDoc;
