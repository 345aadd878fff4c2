//! Request payload validation.
//!
//! Pure functions: the same payload always produces the same outcome, no
//! side effects. Each endpoint's checks produce a field-level error map;
//! the first message doubles as the flat top-level error in responses.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use shoplink_core::{Email, Price};

use crate::models::product::{NewProduct, ProductUpdate};

/// Minimum password length for registration and login payloads.
pub const MIN_PASSWORD_LENGTH: usize = 6;

const MIN_NAME_LENGTH: usize = 4;
const MIN_DESCRIPTION_LENGTH: usize = 20;
const MIN_CATEGORY_LENGTH: usize = 2;

/// A field → messages map collected while validating a payload.
///
/// Ordered (`BTreeMap`) so that the "first message" surfaced as the flat
/// error is deterministic.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// True if no field has any message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first recorded message, if any.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .values()
            .next()
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Turn the collected map into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any message was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// =============================================================================
// Auth payloads
// =============================================================================

/// Validate a register/login payload.
///
/// # Errors
///
/// Returns the field-level error map if the email does not parse or the
/// password is missing or shorter than [`MIN_PASSWORD_LENGTH`].
pub fn credentials(
    email: Option<&str>,
    password: Option<&str>,
) -> Result<(Email, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let parsed = match email {
        None => {
            errors.push("email", "El correo electrónico es requerido");
            None
        }
        Some(raw) => match Email::parse(raw) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push("email", "El correo electrónico no es valido");
                None
            }
        },
    };

    let password = match password {
        None => {
            errors.push("password", "La contraseña es requerida");
            None
        }
        Some(p) if p.len() < MIN_PASSWORD_LENGTH => {
            errors.push(
                "password",
                format!("La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"),
            );
            None
        }
        Some(p) => Some(p.to_owned()),
    };

    match (parsed, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(errors),
    }
}

// =============================================================================
// Product payloads
// =============================================================================

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        errors.push(
            "name",
            format!("El nombre debe tener al menos {MIN_NAME_LENGTH} caracteres"),
        );
    }
}

fn check_description(errors: &mut ValidationErrors, description: &str) {
    if description.trim().chars().count() < MIN_DESCRIPTION_LENGTH {
        errors.push(
            "description",
            format!("La descripcion debe tener al menos {MIN_DESCRIPTION_LENGTH} caracteres"),
        );
    }
}

fn check_category(errors: &mut ValidationErrors, category: &str) {
    if category.trim().chars().count() < MIN_CATEGORY_LENGTH {
        errors.push(
            "category",
            format!("La categoria debe tener al menos {MIN_CATEGORY_LENGTH} caracteres"),
        );
    }
}

fn check_price(errors: &mut ValidationErrors, price: Decimal) -> Option<Price> {
    match Price::new(price) {
        Ok(price) => Some(price),
        Err(_) => {
            errors.push("price", "El precio no puede ser negativo");
            None
        }
    }
}

fn check_stock(errors: &mut ValidationErrors, stock: i32) {
    if stock < 0 {
        errors.push("stock", "El stock no puede ser negativo");
    }
}

/// Fields accepted for product creation, all optional until validated.
#[derive(Debug, Default, Clone)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

/// Validate a full product creation payload.
///
/// # Errors
///
/// Returns the field-level error map if any required field is missing or
/// out of range.
pub fn new_product(draft: ProductDraft) -> Result<NewProduct, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match draft.name.as_deref() {
        None => errors.push("name", "El nombre es requerido"),
        Some(name) => check_name(&mut errors, name),
    }
    match draft.description.as_deref() {
        None => errors.push("description", "La descripcion es requerida"),
        Some(description) => check_description(&mut errors, description),
    }
    match draft.category.as_deref() {
        None => errors.push("category", "La categoria es requerida"),
        Some(category) => check_category(&mut errors, category),
    }
    let price = match draft.price {
        None => {
            errors.push("price", "El precio es requerido");
            None
        }
        Some(price) => check_price(&mut errors, price),
    };
    match draft.stock {
        None => errors.push("stock", "El stock es requerido"),
        Some(stock) => check_stock(&mut errors, stock),
    }

    errors.into_result()?;

    // All fields checked above; the map is empty so every value is present.
    let (Some(name), Some(description), Some(category), Some(price), Some(stock)) = (
        draft.name,
        draft.description,
        draft.category,
        price,
        draft.stock,
    ) else {
        return Err(ValidationErrors::new());
    };

    Ok(NewProduct {
        name,
        description,
        price,
        category,
        stock,
        image: draft.image,
    })
}

/// Validate a partial product update payload: the same rules as creation,
/// applied only to the fields that are present.
///
/// # Errors
///
/// Returns the field-level error map if any present field is out of range.
pub fn product_update(draft: ProductDraft) -> Result<ProductUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(name) = draft.name.as_deref() {
        check_name(&mut errors, name);
    }
    if let Some(description) = draft.description.as_deref() {
        check_description(&mut errors, description);
    }
    if let Some(category) = draft.category.as_deref() {
        check_category(&mut errors, category);
    }
    let price = draft.price.and_then(|p| check_price(&mut errors, p));
    if let Some(stock) = draft.stock {
        check_stock(&mut errors, stock);
    }

    errors.into_result()?;

    Ok(ProductUpdate {
        name: draft.name,
        description: draft.description,
        price,
        category: draft.category,
        stock: draft.stock,
        image: draft.image,
    })
}

// =============================================================================
// Contact payload
// =============================================================================

/// A validated contact-form submission.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub subject: String,
    pub reply_to: Email,
    pub message: String,
}

/// Validate a contact-form payload.
///
/// # Errors
///
/// Returns the field-level error map if any field is missing or the email
/// does not parse.
pub fn contact(
    subject: Option<&str>,
    email: Option<&str>,
    message: Option<&str>,
) -> Result<ContactMessage, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let subject = match subject.map(str::trim) {
        None | Some("") => {
            errors.push("subject", "El asunto es requerido");
            None
        }
        Some(subject) => Some(subject.to_owned()),
    };
    let reply_to = match email {
        None => {
            errors.push("email", "El correo electrónico es requerido");
            None
        }
        Some(raw) => match Email::parse(raw) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push("email", "El correo electrónico no es valido");
                None
            }
        },
    };
    let message = match message.map(str::trim) {
        None | Some("") => {
            errors.push("message", "El mensaje es requerido");
            None
        }
        Some(message) => Some(message.to_owned()),
    };

    match (subject, reply_to, message) {
        (Some(subject), Some(reply_to), Some(message)) => Ok(ContactMessage {
            subject,
            reply_to,
            message,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_valid() {
        let (email, password) = credentials(Some("a@b.com"), Some("secret1")).unwrap();
        assert_eq!(email.as_str(), "a@b.com");
        assert_eq!(password, "secret1");
    }

    #[test]
    fn test_credentials_short_password() {
        let errors = credentials(Some("a@b.com"), Some("12345")).unwrap_err();
        assert!(errors.field("password").is_some());
        assert!(errors.field("email").is_none());
    }

    #[test]
    fn test_credentials_bad_email() {
        let errors = credentials(Some("not-an-email"), Some("secret1")).unwrap_err();
        assert_eq!(
            errors.first_message(),
            Some("El correo electrónico no es valido")
        );
    }

    #[test]
    fn test_credentials_missing_both() {
        let errors = credentials(None, None).unwrap_err();
        assert!(errors.field("email").is_some());
        assert!(errors.field("password").is_some());
        // email sorts before password, so its message is surfaced first
        assert_eq!(
            errors.first_message(),
            Some("El correo electrónico es requerido")
        );
    }

    #[test]
    fn test_credentials_is_pure() {
        let a = credentials(Some("x"), Some("123")).unwrap_err();
        let b = credentials(Some("x"), Some("123")).unwrap_err();
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    fn full_draft() -> ProductDraft {
        ProductDraft {
            name: Some("Teclado mecanico".to_owned()),
            description: Some("Teclado mecanico con switches rojos".to_owned()),
            price: Some(Decimal::new(19999, 2)),
            category: Some("perifericos".to_owned()),
            stock: Some(25),
            image: None,
        }
    }

    #[test]
    fn test_new_product_valid() {
        let product = new_product(full_draft()).unwrap();
        assert_eq!(product.name, "Teclado mecanico");
        assert_eq!(product.stock, 25);
    }

    #[test]
    fn test_new_product_negative_price() {
        let draft = ProductDraft {
            price: Some(Decimal::new(-5, 0)),
            ..full_draft()
        };
        let errors = new_product(draft).unwrap_err();
        assert_eq!(
            errors.field("price").unwrap(),
            &["El precio no puede ser negativo".to_owned()]
        );
    }

    #[test]
    fn test_new_product_missing_fields() {
        let errors = new_product(ProductDraft::default()).unwrap_err();
        for field in ["name", "description", "price", "category", "stock"] {
            assert!(errors.field(field).is_some(), "missing errors for {field}");
        }
    }

    #[test]
    fn test_new_product_zero_price_and_stock_allowed() {
        let draft = ProductDraft {
            price: Some(Decimal::ZERO),
            stock: Some(0),
            ..full_draft()
        };
        assert!(new_product(draft).is_ok());
    }

    #[test]
    fn test_product_update_partial_ok() {
        let update = product_update(ProductDraft {
            stock: Some(5),
            ..ProductDraft::default()
        })
        .unwrap();
        assert_eq!(update.stock, Some(5));
        assert!(update.name.is_none());
    }

    #[test]
    fn test_product_update_rejects_present_invalid_field() {
        let errors = product_update(ProductDraft {
            stock: Some(-1),
            ..ProductDraft::default()
        })
        .unwrap_err();
        assert!(errors.field("stock").is_some());
    }

    #[test]
    fn test_contact_valid() {
        let message = contact(Some("Consulta"), Some("a@b.com"), Some("Hola!")).unwrap();
        assert_eq!(message.subject, "Consulta");
        assert_eq!(message.reply_to.as_str(), "a@b.com");
    }

    #[test]
    fn test_contact_missing_fields() {
        let errors = contact(None, Some("a@b.com"), Some("")).unwrap_err();
        assert!(errors.field("subject").is_some());
        assert!(errors.field("message").is_some());
        assert!(errors.field("email").is_none());
    }
}
