use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use std::sync::Arc;

use crate::logic::{sale_commissions, vendor_totals, RuleTable};
use crate::model::{
    Id, ListResponse, NewSale, Rule, Sale, SaleCommission, Vendor, VendorCommission,
};
use crate::store::CommissionStore;

pub type AppState<S> = Arc<S>;

type ApiError = (StatusCode, Json<ErrorResponse>);

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Logs the full cause chain; the client only sees a generic message.
fn internal_error(e: anyhow::Error) -> ApiError {
    log::error!("Request failed: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE)),
    )
}

fn vendor_not_found(vendor_id: Id) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("Vendor {} not found", vendor_id))),
    )
}

pub async fn list_rules<S: CommissionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Rule>>, ApiError> {
    let rules = store.list_rules().await.map_err(internal_error)?;
    Ok(Json(rules.into()))
}

pub async fn list_vendors<S: CommissionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Vendor>>, ApiError> {
    let vendors = store.list_vendors().await.map_err(internal_error)?;
    Ok(Json(vendors.into()))
}

pub async fn get_vendor<S: CommissionStore>(
    State(store): State<AppState<S>>,
    Path(vendor_id): Path<Id>,
) -> Result<Json<Vendor>, ApiError> {
    match store.get_vendor(vendor_id).await {
        Ok(Some(vendor)) => Ok(Json(vendor)),
        Ok(None) => Err(vendor_not_found(vendor_id)),
        Err(e) => Err(internal_error(e)),
    }
}

pub async fn list_sales<S: CommissionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Sale>>, ApiError> {
    let sales = store.list_sales().await.map_err(internal_error)?;
    Ok(Json(sales.into()))
}

pub async fn create_sale<S: CommissionStore>(
    State(store): State<AppState<S>>,
    RequestJson(request): RequestJson<NewSale>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    if let Err(message) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&message))));
    }

    match store.get_vendor(request.vendor_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(vendor_not_found(request.vendor_id)),
        Err(e) => return Err(internal_error(e)),
    }

    let sale = store.create_sale(request).await.map_err(internal_error)?;
    log::info!(
        "Recorded sale {} for vendor {} ({:.2})",
        sale.id,
        sale.vendor_id,
        sale.quota_amount
    );

    Ok((StatusCode::CREATED, Json(sale)))
}

/// Commission owed on every recorded sale.
pub async fn list_commissions<S: CommissionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<SaleCommission>>, ApiError> {
    let table = RuleTable::new(store.list_rules().await.map_err(internal_error)?);
    let vendors = store.list_vendors().await.map_err(internal_error)?;
    let sales = store.list_sales().await.map_err(internal_error)?;

    Ok(Json(sale_commissions(&sales, &vendors, &table).into()))
}

/// Commission totals per vendor.
pub async fn list_vendor_commissions<S: CommissionStore>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<VendorCommission>>, ApiError> {
    let table = RuleTable::new(store.list_rules().await.map_err(internal_error)?);
    let vendors = store.list_vendors().await.map_err(internal_error)?;
    let sales = store.list_sales().await.map_err(internal_error)?;

    let commissions = sale_commissions(&sales, &vendors, &table);
    Ok(Json(vendor_totals(&vendors, &commissions).into()))
}

pub async fn get_vendor_commissions<S: CommissionStore>(
    State(store): State<AppState<S>>,
    Path(vendor_id): Path<Id>,
) -> Result<Json<ListResponse<SaleCommission>>, ApiError> {
    let vendor = match store.get_vendor(vendor_id).await {
        Ok(Some(vendor)) => vendor,
        Ok(None) => return Err(vendor_not_found(vendor_id)),
        Err(e) => return Err(internal_error(e)),
    };

    let table = RuleTable::new(store.list_rules().await.map_err(internal_error)?);
    let sales = store
        .list_sales_for_vendor(vendor_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(sale_commissions(&sales, &[vendor], &table).into()))
}
