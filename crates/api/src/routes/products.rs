//! Product route handlers.
//!
//! Reads are public; writes require a valid bearer token. Creation
//! accepts either a JSON body or a multipart form with an optional
//! `image` file, which is persisted through the upload store.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use shoplink_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{ApiError, AppJson};
use crate::middleware::RequireAuth;
use crate::models::product::ProductFilter;
use crate::state::AppState;
use crate::validate::{self, ProductDraft};

/// Query parameters for product listing.
///
/// Numeric filters arrive as raw strings and are parsed leniently: a
/// malformed value is ignored rather than turned into an error.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> ProductFilter {
        ProductFilter::from_raw(
            self.name,
            self.category,
            self.stock.as_deref(),
            self.min_price.as_deref(),
            self.max_price.as_deref(),
        )
    }
}

/// JSON body for product creation and update.
#[derive(Debug, Default, Deserialize)]
pub struct ProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

impl From<ProductBody> for ProductDraft {
    fn from(body: ProductBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            price: body.price,
            category: body.category,
            stock: body.stock,
            image: body.image,
        }
    }
}

/// Extractor for product payloads: JSON, or multipart form data with an
/// optional `image` file that is stored before validation runs.
pub struct ProductPayload(pub ProductDraft);

impl FromRequest<AppState> for ProductPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| ApiError::BadRequest("Datos invalidos".to_owned()))?;
            let draft = draft_from_multipart(multipart, state).await?;
            Ok(Self(draft))
        } else {
            let Json(body): Json<ProductBody> =
                Json::from_request(req, state).await.map_err(ApiError::from)?;
            Ok(Self(body.into()))
        }
    }
}

/// Collect product fields from a multipart form, storing the image file.
async fn draft_from_multipart(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<ProductDraft, ApiError> {
    let mut draft = ProductDraft::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Datos invalidos".to_owned()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or("imagen").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::BadRequest("Datos invalidos".to_owned()))?;
            if !bytes.is_empty() {
                let reference = state.uploads().save(&file_name, &bytes).await.map_err(|e| {
                    tracing::error!(error = %e, "failed to store product image");
                    ApiError::Internal("failed to store product image".to_owned())
                })?;
                draft.image = Some(reference);
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|_| ApiError::BadRequest("Datos invalidos".to_owned()))?;
        match name.as_str() {
            "name" => draft.name = Some(text),
            "description" => draft.description = Some(text),
            "category" => draft.category = Some(text),
            "price" => draft.price = text.trim().parse::<Decimal>().ok(),
            "stock" => draft.stock = text.trim().parse::<i32>().ok(),
            _ => {}
        }
    }

    Ok(draft)
}

/// Parse a path segment into a product ID, or 404 like an unknown row.
fn parse_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| ApiError::NotFound("Id invalido".to_owned()))
}

/// List products, optionally filtered.
///
/// GET /products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter();
    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(json!({ "success": true, "data": products })))
}

/// Fetch a single product.
///
/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto no encontrado".to_owned()))?;

    Ok(Json(json!({ "success": true, "data": product })))
}

/// Create a product.
///
/// POST /products (bearer token required)
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ProductPayload(draft): ProductPayload,
) -> Result<impl IntoResponse, ApiError> {
    let new_product = validate::new_product(draft)?;

    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": product })),
    ))
}

/// Partially update a product.
///
/// PATCH /products/{id} (bearer token required)
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
    AppJson(body): AppJson<ProductBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let update = validate::product_update(body.into())?;

    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto no encontrado".to_owned()))?;

    Ok(Json(json!({ "success": true, "data": product })))
}

/// Delete a product, returning the deleted row.
///
/// DELETE /products/{id} (bearer token required)
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let product = ProductRepository::new(state.pool())
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto no encontrado".to_owned()))?;

    tracing::info!(product_id = %product.id, "product deleted");
    Ok(Json(json!({ "success": true, "data": product })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_numeric() {
        assert_eq!(parse_id("42").unwrap(), ProductId::new(42));
    }

    #[test]
    fn test_parse_id_rejects_non_numeric_as_not_found() {
        let err = parse_id("64f1a2b3c4d5e6f7a8b9c0d1").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_list_query_lenient_parsing() {
        let query = ListQuery {
            min_price: Some("abc".to_owned()),
            max_price: Some("50".to_owned()),
            stock: Some("3".to_owned()),
            ..ListQuery::default()
        };
        let filter = query.into_filter();
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(Decimal::new(50, 0)));
        assert_eq!(filter.min_stock, Some(3));
    }
}
