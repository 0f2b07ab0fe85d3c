// ==================== USER MANAGEMENT ====================
// Registration, edit and delete flows over the record store and image host.
// Every check that can reject a request runs before anything is uploaded.

use crate::{
    models::{NewUser, User, UserChanges},
    repository::UserRepository,
    services::{
        image_host::ImageHost,
        validation::{self, ProfileForm},
    },
    utils::error::{AppError, FieldError},
};

/// Validate → reject duplicate email → upload image → create record.
///
/// A successful upload followed by a failed insert leaves the image orphaned
/// on the host.
pub async fn register(
    users: &dyn UserRepository,
    images: &dyn ImageHost,
    folder: &str,
    form: ProfileForm,
) -> Result<User, AppError> {
    let profile = validation::validate(&form, true)?;

    if users.find_by_email(&profile.email).await?.is_some() {
        log::warn!("⚠️ Registration rejected, email taken: {}", profile.email);
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let image = form.image.ok_or_else(|| {
        AppError::Validation(vec![FieldError::new("image", "Profile image is required")])
    })?;
    let hosted = images.upload(image, folder).await?;

    let user = users
        .create(NewUser {
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            image_url: hosted.url,
            image_public_id: hosted.public_id,
        })
        .await?;

    log::info!("✅ User registered: {}", user.email);
    Ok(user)
}

pub async fn list(users: &dyn UserRepository) -> Result<Vec<User>, AppError> {
    users.find_all().await
}

pub async fn get(users: &dyn UserRepository, id: &str) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))
}

/// Edits a record, optionally swapping its image. The replaced image is
/// destroyed only after the record points at the new one.
pub async fn update(
    users: &dyn UserRepository,
    images: &dyn ImageHost,
    folder: &str,
    id: &str,
    form: ProfileForm,
) -> Result<User, AppError> {
    let profile = validation::validate(&form, false)?;
    let existing = get(users, id).await?;

    if let Some(owner) = users.find_by_email(&profile.email).await? {
        if owner.id != existing.id {
            log::warn!("⚠️ Update rejected, email taken: {}", profile.email);
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
    }

    let replacement = match form.image {
        Some(image) => Some(images.upload(image, folder).await?),
        None => None,
    };

    let updated = users
        .update(
            id,
            UserChanges {
                full_name: profile.full_name,
                email: profile.email,
                phone: profile.phone,
                image: replacement.map(|h| (h.url, h.public_id)),
            },
        )
        .await?;

    if updated.image_public_id != existing.image_public_id {
        remove_image(images, &existing.image_public_id).await;
    }

    log::info!("✅ User updated: {}", updated.email);
    Ok(updated)
}

/// Deletes a record after a best-effort removal of its hosted image.
pub async fn delete(
    users: &dyn UserRepository,
    images: &dyn ImageHost,
    id: &str,
) -> Result<(), AppError> {
    let existing = get(users, id).await?;

    remove_image(images, &existing.image_public_id).await;

    if !users.delete(id).await? {
        return Err(AppError::NotFound(format!("User '{}' not found", id)));
    }

    log::info!("🗑️  User deleted: {}", existing.email);
    Ok(())
}

/// Image cleanup never fails the surrounding operation.
async fn remove_image(images: &dyn ImageHost, public_id: &str) {
    if public_id.is_empty() {
        return;
    }
    if let Err(e) = images.delete(public_id).await {
        log::warn!("⚠️ Could not remove hosted image {}: {}", public_id, e);
    }
}
