use std::path::Path;

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;
use crate::Result;

/// Image types the profile endpoints accept.
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Drain the first file part of a multipart payload to disk and return its
/// public `/uploads/...` path. Rejects missing files, disallowed content
/// types, and bodies over `max_bytes`.
pub async fn save_image(mut payload: Multipart, upload_dir: &Path, max_bytes: usize) -> Result<String> {
    let mut field = payload
        .try_next()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload payload: {}", e)))?
        .ok_or_else(|| AppError::Validation("Image file is required".to_string()))?;

    let content_type = field
        .content_type()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    let ext = extension_for(&content_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported image type '{}'; use jpeg, png, webp or gif",
            content_type
        ))
    })?;

    tokio::fs::create_dir_all(upload_dir).await?;
    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = upload_dir.join(&filename);
    let mut file = tokio::fs::File::create(&path).await?;

    let mut written = 0usize;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("Upload stream failed: {}", e)))?;
        written += chunk.len();
        if written > max_bytes {
            // drop the partial file before reporting the violation
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Validation(format!(
                "Image exceeds the {} byte limit",
                max_bytes
            )));
        }
        file.write_all(&chunk).await?;
    }

    if written == 0 {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(AppError::Validation("Image file is empty".to_string()));
    }

    file.flush().await?;
    Ok(format!("/uploads/{}", filename))
}
