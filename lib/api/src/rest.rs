use actix_cors::Cors;
use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError, Result as ActixResult};
use concursim_core::{BooleanFilterSet, Error, Record, RecordQuery, TermVector};
use concursim_similarity::{
    cluster_items, run_similarity_benchmarks, thresholds_around, ClusterItem, ClusterStrategy, EngineConfig,
    MatchRanker,
};
use concursim_storage::{RecordStatus, RecordStore, VectorCache, VectorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Shared state behind every handler
pub struct AppState {
    pub store: RecordStore,
    pub cache: VectorCache,
    /// Parameters applied when a request leaves them out
    pub defaults: EngineConfig,
    pub ranker: MatchRanker,
}

impl AppState {
    pub fn new(store: RecordStore, defaults: EngineConfig) -> Self {
        Self {
            store,
            cache: VectorCache::new(),
            defaults,
            ranker: MatchRanker::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::RecordNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(Error::InvalidConfig(_)) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

#[derive(Deserialize, Default)]
struct ListParams {
    search: Option<String>,
    pide_tasas: Option<bool>,
    solicita_adaptacion_discapacidad: Option<bool>,
    especialidad_carnet_bombero: Option<bool>,
    especialidad_medicina: Option<bool>,
}

impl ListParams {
    fn into_query(self) -> RecordQuery {
        RecordQuery {
            search: self.search,
            filters: BooleanFilterSet {
                pide_tasas: self.pide_tasas,
                solicita_adaptacion_discapacidad: self.solicita_adaptacion_discapacidad,
                especialidad_carnet_bombero: self.especialidad_carnet_bombero,
                especialidad_medicina: self.especialidad_medicina,
            },
        }
    }
}

#[derive(Deserialize, Default)]
struct ClusterRequest {
    similarity_threshold: Option<f64>,
    strategy: Option<ClusterStrategy>,
    max_iterations: Option<usize>,
    #[serde(default)]
    query: RecordQuery,
}

impl ClusterRequest {
    /// Merge with the server defaults, clamping the threshold for interactive use
    fn config(&self, defaults: &EngineConfig) -> concursim_core::Result<EngineConfig> {
        let config = EngineConfig {
            similarity_threshold: self.similarity_threshold.unwrap_or(defaults.similarity_threshold),
            strategy: self.strategy.unwrap_or(defaults.strategy),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
        }
        .with_recommended_clamp();
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize)]
struct MatchRequest {
    document: Value,
}

#[derive(Deserialize)]
struct DiffRequest {
    current: Value,
    previous: Value,
}

#[derive(Serialize)]
struct CreatedResponse {
    id: i64,
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: RecordStatus,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::from(state.clone()))
                .configure(Self::routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register every endpoint on `cfg`
    pub fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/records", web::get().to(list_records))
            .route("/records", web::post().to(create_record))
            .route("/records/{id}", web::get().to(get_record))
            .route("/records/{id}", web::delete().to(delete_record))
            .route("/records/{id}/status", web::get().to(get_status))
            .route("/records/{id}/status", web::put().to(set_status))
            .route("/clusters", web::post().to(cluster))
            .route("/match", web::post().to(match_document))
            .route("/compare", web::post().to(compare_document))
            .route("/diff", web::post().to(diff_documents))
            .route("/benchmark", web::post().to(benchmark));
    }
}

async fn list_records(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> ActixResult<HttpResponse> {
    let records = state.store.query(&params.into_inner().into_query());
    Ok(HttpResponse::Ok().json(records))
}

async fn create_record(
    state: web::Data<AppState>,
    body: web::Json<Record>,
) -> ActixResult<HttpResponse> {
    let replaces = body.id.is_some_and(|id| state.store.get(id).is_some());
    let id = state.store.insert(body.into_inner());
    if replaces {
        let pruned = state.cache.retain_records(&state.store.list());
        debug!(id, pruned, "record replaced");
    }
    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

async fn get_record(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let record = state.store.get(id).ok_or(Error::RecordNotFound(id))?;
    Ok(HttpResponse::Ok().json(record))
}

async fn get_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let entry = state.store.entry(id).ok_or(Error::RecordNotFound(id))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "status": entry.status,
        "created_at": entry.created_at,
    })))
}

async fn set_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<StatusUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    state.store.set_status(id, body.status)?;
    debug!(id, status = ?body.status, "record status updated");
    Ok(HttpResponse::NoContent().finish())
}

async fn delete_record(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let record = state.store.remove(id)?;
    let pruned = state.cache.retain_records(&state.store.list());
    debug!(id, pruned, "record deleted");
    Ok(HttpResponse::Ok().json(record))
}

async fn cluster(
    state: web::Data<AppState>,
    body: web::Json<ClusterRequest>,
) -> Result<HttpResponse, ApiError> {
    let config = body.config(&state.defaults)?;
    let records = state.store.query(&body.query);
    let vectors = state.cache.vectors(&records, VectorKind::Cluster);

    let items: Vec<ClusterItem<'_>> = records
        .iter()
        .zip(&vectors)
        .map(|(record, vector)| ClusterItem {
            id: record.id,
            filename: &record.filename,
            vector: vector.as_ref(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(cluster_items(&items, &config)))
}

async fn match_document(
    state: web::Data<AppState>,
    body: web::Json<MatchRequest>,
) -> ActixResult<HttpResponse> {
    let query = TermVector::from_value(&body.document);
    let records = state.store.list();
    let vectors = state.cache.vectors(&records, VectorKind::Full);

    let results = state
        .ranker
        .rank_candidates(&query, records.iter().zip(vectors.iter().map(|v| v.as_ref())));
    Ok(HttpResponse::Ok().json(results))
}

async fn compare_document(
    state: web::Data<AppState>,
    body: web::Json<MatchRequest>,
) -> ActixResult<HttpResponse> {
    let query = TermVector::from_value(&body.document);
    let records = state.store.list();
    let vectors = state.cache.vectors(&records, VectorKind::Full);

    let results = state.ranker.compare_candidates(
        &body.document,
        &query,
        records.iter().zip(vectors.iter().map(|v| v.as_ref())),
    );
    Ok(HttpResponse::Ok().json(results))
}

async fn diff_documents(
    state: web::Data<AppState>,
    body: web::Json<DiffRequest>,
) -> ActixResult<HttpResponse> {
    let diffs = state.ranker.diff_schema().diff(&body.current, &body.previous);
    Ok(HttpResponse::Ok().json(diffs))
}

async fn benchmark(
    state: web::Data<AppState>,
    body: web::Json<ClusterRequest>,
) -> Result<HttpResponse, ApiError> {
    let config = body.config(&state.defaults)?;
    let records = state.store.query(&body.query);
    let results = run_similarity_benchmarks(
        &records,
        &thresholds_around(config.similarity_threshold),
        config.strategy,
    );
    Ok(HttpResponse::Ok().json(results))
}
