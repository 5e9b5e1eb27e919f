use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";

const DEFAULT_PAGE_SIZE: usize = 100;

/// A stored resource as it appears in responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub version: u64,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub attributes: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub links: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct NewResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Uuid,
    pub organisation_id: Uuid,
    #[serde(default)]
    pub attributes: Value,
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub data: NewResource,
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(rename = "page[number]")]
    pub number: Option<usize>,
    #[serde(rename = "page[size]")]
    pub size: Option<usize>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub version: u64,
}

/// Error answer in the `{"error_message": …}` shape the real API uses.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error_message": self.1 }))).into_response()
    }
}

/// Accounts in insertion order; list pages follow that order.
pub type Db = Arc<RwLock<Vec<Resource>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route(ACCOUNTS_PATH, get(list_accounts).post(create_account))
        .route(
            "/v1/organisation/accounts/{id}",
            get(fetch_account).delete(delete_account),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn self_link(id: Uuid) -> HashMap<String, String> {
    HashMap::from([("self".to_string(), format!("{ACCOUNTS_PATH}/{id}"))])
}

async fn list_accounts(
    State(db): State<Db>,
    Query(params): Query<PageParams>,
) -> Json<Envelope<Vec<Resource>>> {
    let number = params.number.unwrap_or(0);
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let accounts = db.read().await;
    let page: Vec<Resource> = accounts
        .iter()
        .skip(number.saturating_mul(size))
        .take(size)
        .cloned()
        .collect();

    let last = accounts.len().saturating_sub(1) / size;
    let page_link = |n: usize| format!("{ACCOUNTS_PATH}?page[number]={n}&page[size]={size}");
    let links = HashMap::from([
        ("self".to_string(), page_link(number)),
        ("first".to_string(), page_link(0)),
        ("last".to_string(), page_link(last)),
    ]);

    Json(Envelope { data: page, links })
}

async fn create_account(
    State(db): State<Db>,
    Json(input): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Envelope<Resource>>), ApiError> {
    let input = input.data;
    let mut accounts = db.write().await;
    if accounts.iter().any(|a| a.id == input.id) {
        return Err(ApiError(
            StatusCode::CONFLICT,
            format!("Account cannot be created as it violates a duplicate constraint: {}", input.id),
        ));
    }

    let now = Utc::now();
    let account = Resource {
        resource_type: input.resource_type,
        id: input.id,
        organisation_id: input.organisation_id,
        version: 0,
        created_on: now,
        modified_on: now,
        attributes: input.attributes,
    };
    accounts.push(account.clone());
    info!(id = %account.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            links: self_link(account.id),
            data: account,
        }),
    ))
}

async fn fetch_account(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Resource>>, ApiError> {
    let accounts = db.read().await;
    accounts
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .map(|account| {
            Json(Envelope {
                data: account,
                links: self_link(id),
            })
        })
        .ok_or_else(|| not_found(id))
}

/// Unknown ids and unknown versions both answer 404, matching the real server.
async fn delete_account(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError> {
    let mut accounts = db.write().await;
    let index = accounts
        .iter()
        .position(|a| a.id == id && a.version == params.version)
        .ok_or_else(|| not_found(id))?;
    accounts.remove(index);
    info!(id = %id, version = params.version, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: Uuid) -> ApiError {
    ApiError(
        StatusCode::NOT_FOUND,
        format!("record {id} does not exist"),
    )
}
