//! Inventory endpoints: products, stock movements, alerts and the dashboard.
//!
//! Each method binds a path, method and body and hands the call to
//! [`ApiClient::execute`]; typed results are decoded from its payload.

mod models;

pub use models::{
    AlertKind, Dashboard, MovementInput, MovementKind, Price, Product, ProductInput,
    StockAlert, StockMovement, StockStatus,
};

use crate::client::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

pub const PRODUCTS_PATH: &str = "/api/produtos/";
pub const MOVEMENTS_PATH: &str = "/api/movimentacoes/";
pub const ALERTS_PATH: &str = "/api/alertas/";
pub const DASHBOARD_PATH: &str = "/api/dashboard/";

fn product_path(id: i64) -> String {
    format!("{PRODUCTS_PATH}{id}/")
}

fn mark_alert_read_path(id: i64) -> String {
    format!("{ALERTS_PATH}{id}/marcar_como_lido/")
}

impl ApiClient {
    /// `GET /api/produtos/`, filtered by name or description when `search` is non-empty.
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, RequestError> {
        let mut request = RequestDescriptor::get(PRODUCTS_PATH);
        if let Some(term) = search.filter(|term| !term.is_empty()) {
            request = request.with_query("search", term);
        }
        self.execute(&request).await?.decode()
    }

    /// `GET /api/produtos/{id}/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn get_product(&self, id: i64) -> Result<Product, RequestError> {
        self.execute(&RequestDescriptor::get(product_path(id)))
            .await?
            .decode()
    }

    /// `POST /api/produtos/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, RequestError> {
        let request = RequestDescriptor::post(PRODUCTS_PATH).with_json(input)?;
        self.execute(&request).await?.decode()
    }

    /// `PUT /api/produtos/{id}/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn update_product(
        &self,
        id: i64,
        input: &ProductInput,
    ) -> Result<Product, RequestError> {
        let request = RequestDescriptor::put(product_path(id)).with_json(input)?;
        self.execute(&request).await?.decode()
    }

    /// `DELETE /api/produtos/{id}/`; success is `ApiResponse::NoContent`.
    /// # Errors
    /// Returns the `execute` error contract.
    pub async fn delete_product(&self, id: i64) -> Result<ApiResponse, RequestError> {
        self.execute(&RequestDescriptor::delete(product_path(id)))
            .await
    }

    /// `GET /api/movimentacoes/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn list_movements(&self) -> Result<Vec<StockMovement>, RequestError> {
        self.execute(&RequestDescriptor::get(MOVEMENTS_PATH))
            .await?
            .decode()
    }

    /// `POST /api/movimentacoes/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn create_movement(
        &self,
        input: &MovementInput,
    ) -> Result<StockMovement, RequestError> {
        let request = RequestDescriptor::post(MOVEMENTS_PATH).with_json(input)?;
        self.execute(&request).await?.decode()
    }

    /// `GET /api/alertas/` (unread alerts)
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn list_alerts(&self) -> Result<Vec<StockAlert>, RequestError> {
        self.execute(&RequestDescriptor::get(ALERTS_PATH))
            .await?
            .decode()
    }

    /// `POST /api/alertas/{id}/marcar_como_lido/`
    /// # Errors
    /// Returns the `execute` error contract.
    pub async fn mark_alert_read(&self, id: i64) -> Result<ApiResponse, RequestError> {
        self.execute(&RequestDescriptor::post(mark_alert_read_path(id)))
            .await
    }

    /// `GET /api/dashboard/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` on an unexpected shape.
    pub async fn dashboard(&self) -> Result<Dashboard, RequestError> {
        self.execute(&RequestDescriptor::get(DASHBOARD_PATH))
            .await?
            .decode()
    }
}
