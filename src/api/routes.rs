//! API Routes
//!
//! HTTP endpoint definitions for the account and address resources.

use axum::extract::{Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::model::{Account, AccountUpdate, Address, NewAccount, NewAddress};
use crate::store::{AccountStore, AddressStore};
use crate::validation::required_text;

use super::extract::{Json, Path};

// =========================================================================
// Request/Response types
// =========================================================================

/// Service metadata returned from the root URL.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub paths: String,
}

/// Query parameters accepted by the account list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Exact-match filter on the account name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Fields a client may send when creating an account.
///
/// A serialized account can be posted back as-is: `id` is accepted but
/// ignored (identifiers are store-assigned), and a nested `addresses` array
/// is created together with the account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Defaults to the current date when omitted.
    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
    #[serde(default)]
    pub addresses: Vec<AddressRequest>,
}

impl CreateAccountRequest {
    /// Validate required fields and produce an insertable record.
    fn validate(self) -> AppResult<NewAccount> {
        let addresses = self
            .addresses
            .into_iter()
            .map(AddressRequest::validate)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(NewAccount {
            name: required_text("Account", "name", self.name.as_deref().unwrap_or_default())?,
            email: required_text("Account", "email", self.email.as_deref().unwrap_or_default())?,
            phone_number: required_text(
                "Account",
                "phone_number",
                self.phone_number.as_deref().unwrap_or_default(),
            )?,
            date_joined: self.date_joined,
            addresses,
        })
    }
}

/// Fields a client must send when replacing an account.
///
/// `id` and `addresses` are accepted so a fetched record can be sent back
/// unchanged; both are ignored, addresses are managed through their own
/// endpoints.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
    #[serde(default)]
    #[allow(dead_code)]
    pub addresses: Vec<AddressRequest>,
}

impl UpdateAccountRequest {
    /// Validate required fields and produce a full replacement record.
    fn validate(self) -> AppResult<AccountUpdate> {
        Ok(AccountUpdate {
            name: required_text("Account", "name", self.name.as_deref().unwrap_or_default())?,
            email: required_text("Account", "email", self.email.as_deref().unwrap_or_default())?,
            phone_number: required_text(
                "Account",
                "phone_number",
                self.phone_number.as_deref().unwrap_or_default(),
            )?,
            date_joined: self.date_joined.ok_or_else(|| {
                AppError::Validation("Invalid Account: missing date_joined".to_string())
            })?,
        })
    }
}

/// Fields a client may send for an address, on create or full replace.
///
/// `id` and `account_id` are accepted so a fetched record can be sent back
/// unchanged; both are ignored, the owning account always comes from the
/// request path.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub id: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl AddressRequest {
    /// Validate required fields and produce an insertable record.
    fn validate(self) -> AppResult<NewAddress> {
        Ok(NewAddress {
            name: required_text("Address", "name", self.name.as_deref().unwrap_or_default())?,
            street: required_text(
                "Address",
                "street",
                self.street.as_deref().unwrap_or_default(),
            )?,
            city: required_text("Address", "city", self.city.as_deref().unwrap_or_default())?,
            state: required_text("Address", "state", self.state.as_deref().unwrap_or_default())?,
            postal_code: required_text(
                "Address",
                "postal_code",
                self.postal_code.as_deref().unwrap_or_default(),
            )?,
        })
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Service metadata
        .route("/", get(index))
        // Account CRUD
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id", put(update_account))
        .route("/accounts/:account_id", delete(delete_account))
        // Address CRUD, scoped under the owning account
        .route("/accounts/:account_id/addresses", get(list_addresses))
        .route("/accounts/:account_id/addresses", post(create_address))
        .route(
            "/accounts/:account_id/addresses/:address_id",
            get(get_address),
        )
        .route(
            "/accounts/:account_id/addresses/:address_id",
            put(update_address),
        )
        .route(
            "/accounts/:account_id/addresses/:address_id",
            delete(delete_address),
        )
}

/// 404 unless the parent account exists.
async fn require_account(store: &AccountStore, account_id: i64) -> AppResult<()> {
    if !store.exists(account_id).await? {
        return Err(AppError::AccountNotFound(account_id));
    }
    Ok(())
}

/// Reject a wrong media type up front. Any other body rejection is kept so
/// the handler can report it after its existence checks; a missing target
/// answers 404 even when the body would not decode.
fn check_media_type<T>(body: Result<Json<T>, AppError>) -> AppResult<Result<Json<T>, AppError>> {
    match body {
        Err(err @ AppError::UnsupportedMediaType(_)) => Err(err),
        other => Ok(other),
    }
}

// =========================================================================
// GET /
// =========================================================================

/// Root URL: metadata a client can use to find the accounts resource.
async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Account REST API Service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        paths: "/accounts".to_string(),
    })
}

// =========================================================================
// GET /accounts
// =========================================================================

/// List all accounts, optionally filtered by exact name
async fn list_accounts(
    State(pool): State<PgPool>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    tracing::info!("Request for Account list");

    let store = AccountStore::new(pool);
    // An empty filter value means no filter.
    let name = query.name.as_deref().filter(|name| !name.is_empty());
    let accounts = store.list(name).await?;

    tracing::info!("Returning {} accounts", accounts.len());
    Ok(Json(accounts))
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Create a new account
async fn create_account(
    State(pool): State<PgPool>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Account>), AppError> {
    tracing::info!("Request to create an Account");

    let new_account = request.validate()?;
    let store = AccountStore::new(pool);
    let account = store.insert(new_account).await?;

    tracing::info!("Account with new id {} created", account.id);
    let location = format!("/accounts/{}", account.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(account),
    ))
}

// =========================================================================
// GET /accounts/:account_id
// =========================================================================

/// Read a single account
async fn get_account(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    tracing::info!("Request for Account with id: {}", account_id);

    let store = AccountStore::new(pool);
    let account = store
        .find(account_id)
        .await?
        .ok_or(AppError::AccountNotFound(account_id))?;

    Ok(Json(account))
}

// =========================================================================
// PUT /accounts/:account_id
// =========================================================================

/// Replace an account's scalar attributes
async fn update_account(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
    body: Result<Json<UpdateAccountRequest>, AppError>,
) -> Result<Json<Account>, AppError> {
    tracing::info!("Request to update an Account with id: {}", account_id);

    let body = check_media_type(body)?;

    let store = AccountStore::new(pool);
    if !store.exists(account_id).await? {
        return Err(AppError::AccountNotFound(account_id));
    }

    let Json(request) = body?;
    let update = request.validate()?;
    let account = store
        .replace(account_id, update)
        .await?
        .ok_or(AppError::AccountNotFound(account_id))?;

    Ok(Json(account))
}

// =========================================================================
// DELETE /accounts/:account_id
// =========================================================================

/// Delete an account and all of its addresses
async fn delete_account(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Request to delete an Account with id: {}", account_id);

    let store = AccountStore::new(pool);
    // Idempotent: removing an unknown id is a successful no-op.
    store.delete(account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// GET /accounts/:account_id/addresses
// =========================================================================

/// List the addresses of an account
async fn list_addresses(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<Vec<Address>>, AppError> {
    tracing::info!("Request for Address list for Account with id: {}", account_id);

    let accounts = AccountStore::new(pool.clone());
    require_account(&accounts, account_id).await?;

    let store = AddressStore::new(pool);
    let addresses = store.list(account_id).await?;

    Ok(Json(addresses))
}

// =========================================================================
// POST /accounts/:account_id/addresses
// =========================================================================

/// Create a new address under an account
async fn create_address(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
    body: Result<Json<AddressRequest>, AppError>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Address>), AppError> {
    tracing::info!("Request to create an Address for Account with id: {}", account_id);

    let body = check_media_type(body)?;

    let accounts = AccountStore::new(pool.clone());
    require_account(&accounts, account_id).await?;

    let Json(request) = body?;
    let new_address = request.validate()?;
    let store = AddressStore::new(pool);
    let address = store.insert(account_id, new_address).await?;

    tracing::info!("Address with new id {} created", address.id);
    let location = format!("/accounts/{}/addresses/{}", account_id, address.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(address),
    ))
}

// =========================================================================
// GET /accounts/:account_id/addresses/:address_id
// =========================================================================

/// Read a single address of an account
async fn get_address(
    State(pool): State<PgPool>,
    Path((account_id, address_id)): Path<(i64, i64)>,
) -> Result<Json<Address>, AppError> {
    tracing::info!(
        "Request for Address with id: {} under Account with id: {}",
        address_id,
        account_id
    );

    let accounts = AccountStore::new(pool.clone());
    require_account(&accounts, account_id).await?;

    let store = AddressStore::new(pool);
    let address = store
        .find(account_id, address_id)
        .await?
        .ok_or(AppError::AddressNotFound(address_id))?;

    Ok(Json(address))
}

// =========================================================================
// PUT /accounts/:account_id/addresses/:address_id
// =========================================================================

/// Replace an address's fields (all but the owning account)
async fn update_address(
    State(pool): State<PgPool>,
    Path((account_id, address_id)): Path<(i64, i64)>,
    body: Result<Json<AddressRequest>, AppError>,
) -> Result<Json<Address>, AppError> {
    tracing::info!(
        "Request to update an Address with id: {} under Account with id: {}",
        address_id,
        account_id
    );

    let body = check_media_type(body)?;

    let accounts = AccountStore::new(pool.clone());
    require_account(&accounts, account_id).await?;

    let store = AddressStore::new(pool);
    if store.find(account_id, address_id).await?.is_none() {
        return Err(AppError::AddressNotFound(address_id));
    }

    let Json(request) = body?;
    let new_address = request.validate()?;
    let address = store
        .replace(account_id, address_id, new_address)
        .await?
        .ok_or(AppError::AddressNotFound(address_id))?;

    Ok(Json(address))
}

// =========================================================================
// DELETE /accounts/:account_id/addresses/:address_id
// =========================================================================

/// Delete a single address of an account
async fn delete_address(
    State(pool): State<PgPool>,
    Path((account_id, address_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    tracing::info!(
        "Request to delete an Address with id: {} under Account with id: {}",
        address_id,
        account_id
    );

    let accounts = AccountStore::new(pool.clone());
    require_account(&accounts, account_id).await?;

    let store = AddressStore::new(pool);
    let deleted = store.delete(account_id, address_id).await?;
    if !deleted {
        return Err(AppError::AddressNotFound(address_id));
    }

    Ok(StatusCode::NO_CONTENT)
}
