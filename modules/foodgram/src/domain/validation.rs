use std::collections::HashSet;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;

use crate::contract::model::{IngredientAmount, NewUser, RecipePatch};
use crate::domain::error::DomainError;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 1440;
pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 32_000;
pub const MAX_RECIPE_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_USER_FIELD_LEN: usize = 150;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));
static IMAGE_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|webp);base64,(.+)$").expect("valid image regex")
});

pub fn validate_new_user(user: &NewUser) -> Result<(), DomainError> {
    if user.email.chars().count() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(&user.email) {
        return Err(DomainError::validation(
            "email",
            format!("'{}' is not a valid email address", user.email),
        ));
    }
    if user.username.chars().count() > MAX_USER_FIELD_LEN || !USERNAME_RE.is_match(&user.username)
    {
        return Err(DomainError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_ (max 150 characters)",
        ));
    }
    for (field, value) in [
        ("first_name", &user.first_name),
        ("last_name", &user.last_name),
    ] {
        if value.chars().count() > MAX_USER_FIELD_LEN {
            return Err(DomainError::validation(
                field,
                format!("must be at most {MAX_USER_FIELD_LEN} characters"),
            ));
        }
    }
    Ok(())
}

/// Accepts `data:image/<png|jpeg|jpg|gif|webp>;base64,<payload>` whose decoded
/// payload is non-empty and at most `max_bytes`.
pub fn validate_image(field: &str, uri: &str, max_bytes: usize) -> Result<(), DomainError> {
    let caps = IMAGE_URI_RE.captures(uri).ok_or_else(|| {
        DomainError::validation(field, "expected a base64 data URI with an image type")
    })?;
    let payload = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    // every 4 base64 chars carry 3 bytes; reject before decoding huge payloads
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(too_large(field, max_bytes));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| DomainError::validation(field, "image payload is not valid base64"))?;
    if bytes.is_empty() {
        return Err(DomainError::validation(field, "image is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(too_large(field, max_bytes));
    }
    Ok(())
}

fn too_large(field: &str, max_bytes: usize) -> DomainError {
    DomainError::validation(
        field,
        format!("image is too large (max {} bytes)", max_bytes),
    )
}

pub fn validate_recipe_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_RECIPE_NAME_LEN {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {MAX_RECIPE_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::validation("text", "must not be empty"));
    }
    Ok(())
}

pub fn validate_cooking_time(minutes: i32) -> Result<(), DomainError> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&minutes) {
        return Err(DomainError::validation(
            "cooking_time",
            format!("must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME} minutes"),
        ));
    }
    Ok(())
}

/// Non-empty, no repeated ingredient, every amount within bounds.
pub fn validate_ingredients(items: &[IngredientAmount]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "ingredients",
            "at least one ingredient is required",
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.ingredient_id) {
            return Err(DomainError::validation(
                "ingredients",
                format!("ingredient {} is listed more than once", item.ingredient_id),
            ));
        }
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(DomainError::validation(
                "ingredients",
                format!(
                    "amount for ingredient {} must be between {MIN_AMOUNT} and {MAX_AMOUNT}",
                    item.ingredient_id
                ),
            ));
        }
    }
    Ok(())
}

pub fn validate_recipe_patch(patch: &RecipePatch, max_image_bytes: usize) -> Result<(), DomainError> {
    if let Some(name) = &patch.name {
        validate_recipe_name(name)?;
    }
    if let Some(text) = &patch.text {
        validate_text(text)?;
    }
    if let Some(minutes) = patch.cooking_time {
        validate_cooking_time(minutes)?;
    }
    if let Some(image) = &patch.image {
        validate_image("image", image, max_image_bytes)?;
    }
    if let Some(items) = &patch.ingredients {
        validate_ingredients(items)?;
    }
    Ok(())
}
