/// Upload handler - multipart video intake
///
/// Save, then notify the catalog inline, then answer. Search indexing and
/// transcoding are launched detached by the pipeline and are only guaranteed
/// to have started when the response goes out.
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use video_core::constants::{MAX_TEXT_FIELD_BYTES, VIDEO_FIELD};
use video_core::{naming, VideoAsset};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{UploadForm, UploadResponse};
use crate::services::video::PendingWrite;
use crate::services::IngestPipeline;

const MISSING_VIDEO: &str = "No video file uploaded";

/// Accept a video upload
/// POST /upload (alias POST /)
pub async fn upload_video(
    config: web::Data<Config>,
    pipeline: web::Data<IngestPipeline>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let limit = config.storage.max_body_bytes;
    let mut received: u64 = 0;
    let mut form = UploadForm::default();
    let mut video: Option<(String, PendingWrite)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = field.name().unwrap_or_default().to_string();

        if name == VIDEO_FIELD && video.is_none() {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .and_then(naming::sanitize_file_name)
                .ok_or_else(|| AppError::InvalidRequest(MISSING_VIDEO.to_string()))?;

            let mut write = pipeline.storage().begin(&file_name).await.map_err(|err| {
                tracing::error!(asset_id = %file_name, error = %err, "Failed to open upload file");
                AppError::Storage(err)
            })?;

            while let Some(chunk) = field.next().await {
                let chunk = chunk?;
                received += chunk.len() as u64;
                if received > limit {
                    return Err(AppError::PayloadTooLarge { limit });
                }
                write.write_chunk(&chunk).await.map_err(|err| {
                    tracing::error!(asset_id = %file_name, error = %err, "Failed to write upload");
                    AppError::Storage(err)
                })?;
            }

            video = Some((file_name, write));
            continue;
        }

        // Text fields, plus any repeated video part which is drained and ignored
        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            received += chunk.len() as u64;
            if received > limit {
                return Err(AppError::PayloadTooLarge { limit });
            }
            if name != VIDEO_FIELD {
                if value.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                    return Err(AppError::InvalidRequest(format!(
                        "Field '{}' exceeds {} bytes",
                        name, MAX_TEXT_FIELD_BYTES
                    )));
                }
                value.extend_from_slice(&chunk);
            }
        }
        if name != VIDEO_FIELD {
            form.set_field(&name, String::from_utf8_lossy(&value).into_owned());
        }
    }

    let (id, write) = video.ok_or_else(|| AppError::InvalidRequest(MISSING_VIDEO.to_string()))?;
    let size = write.bytes_written();
    write.commit().await.map_err(|err| {
        tracing::error!(asset_id = %id, error = %err, "Failed to save video");
        AppError::Storage(err)
    })?;
    tracing::info!(asset_id = %id, bytes = size, "Video saved");

    let asset = VideoAsset::new(id, pipeline.storage().root(), form.into_metadata());
    let path = pipeline.publish(asset).await;

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Video uploaded successfully".to_string(),
        path,
    }))
}
