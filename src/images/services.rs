use anyhow::Context;
use uuid::Uuid;

use super::ImageRef;
use crate::form::UploadedFile;
use crate::storage::StorageClient;

pub fn offer_prefix(offer_id: Uuid) -> String {
    format!("offers/{}/", offer_id)
}

/// Fixed per offer so a new picture overwrites the previous one.
pub fn offer_image_key(offer_id: Uuid) -> String {
    format!("{}picture", offer_prefix(offer_id))
}

pub fn avatar_key(user_id: Uuid) -> String {
    format!("users/{}/avatar", user_id)
}

pub async fn upload_image(
    storage: &dyn StorageClient,
    key: &str,
    file: UploadedFile,
) -> anyhow::Result<ImageRef> {
    storage
        .put_object(key, file.body, &file.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(ImageRef {
        secure_url: storage.public_url(key),
        original_filename: original_filename(&file.file_name),
    })
}

/// File name as the client knew it, without directories or extension.
fn original_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}
