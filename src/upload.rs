use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::web;
use futures_util::StreamExt;
use tempfile::{Builder, TempDir};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const FILE_FIELD: &str = "file";
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

// dropping this removes the enclosing temporary directory
#[derive(Debug)]
pub struct SavedUpload {
    _dir: TempDir,
    pub path: PathBuf,
    pub filename: String,
    pub size: usize,
}

pub fn validate_filename(filename: Option<&str>) -> Result<String> {
    let filename = match filename {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(AppError::NoFileSelected),
    };

    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or(AppError::InvalidFileType)?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::InvalidFileType)
    }
}

pub async fn save_upload(
    mut payload: Multipart,
    upload_dir: &Path,
    max_bytes: usize,
) -> Result<SavedUpload> {
    let upload_dir = upload_dir.to_path_buf();
    let dir = web::block(move || {
        std::fs::create_dir_all(&upload_dir)?;
        Builder::new().prefix("upload").tempdir_in(&upload_dir)
    })
    .await??;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field.content_disposition();
        if disposition.get_name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = disposition.get_filename().map(str::to_owned);
        let ext = validate_filename(original_name.as_deref())?;
        let path = dir.path().join(format!("{}.{}", Uuid::new_v4(), ext));

        let path_for_create = path.clone();
        let mut f = web::block(move || File::create(&path_for_create)).await??;

        let mut size = 0usize;
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            size += data.len();
            if size > max_bytes {
                return Err(AppError::PayloadTooLarge { limit: max_bytes });
            }
            f = web::block(move || f.write_all(&data).map(|_| f)).await??;
        }

        tracing::debug!(
            "saved upload {:?} ({} bytes) to {}",
            original_name,
            size,
            path.display()
        );

        return Ok(SavedUpload {
            _dir: dir,
            path,
            filename: original_name.unwrap_or_default(),
            size,
        });
    }

    Err(AppError::NoFileUploaded)
}
