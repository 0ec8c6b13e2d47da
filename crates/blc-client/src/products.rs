//! Catalog reads and the admin product surface.

use blc_schemas::{NewProduct, Product, ProductPatch};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /products`: the whole catalog, active and inactive. Client
    /// views filter on `is_active`; the admin board shows everything.
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products").await
    }

    /// `POST /products` (admin).
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.post_json("/products", product).await
    }

    /// `PATCH /products/:id` (admin): partial update, used for edits and
    /// for the `is_active` sold-out toggle.
    pub async fn update_product(
        &self,
        product_id: &str,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        self.patch_json(&format!("/products/{product_id}"), patch).await
    }
}
