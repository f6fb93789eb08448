use crate::{
    config::Config,
    errors::ApiError,
    models::file::StoredFile,
    naming,
    storage::{Storage, StorageError},
};
use actix_multipart::Multipart;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt as _;
use sanitize_filename::sanitize;
use serde::{Deserialize, Serialize};

/// Run a storage call on actix's blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f).await??)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResp {
    pub success: bool,
    pub message: String,
    pub file_name: String,
    pub original_name: String,
    pub size: usize,
}

struct ReceivedFile {
    original_name: String,
    data: Vec<u8>,
}

pub async fn upload_file(
    cfg: web::Data<Config>,
    storage: web::Data<Storage>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut received: Option<ReceivedFile> = None;
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("invalid multipart".into()))?
    {
        if received.is_some() || field.name() != Some("file") {
            continue;
        }
        // a `file` field without a filename is a plain text value, not a file
        let original_name = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| ApiError::BadRequest("upload read error".into()))?
        {
            data.extend_from_slice(&chunk);
            if data.len() > cfg.max_upload_size {
                return Err(ApiError::BadRequest("file too large".into()));
            }
        }
        received = Some(ReceivedFile { original_name, data });
    }
    let ReceivedFile { original_name, data } =
        received.ok_or(ApiError::BadRequest("No file received".into()))?;

    let safe_name = sanitize(&original_name);
    if safe_name.is_empty() {
        return Err(ApiError::BadRequest("invalid file name".into()));
    }
    let storage_name = naming::make_storage_name(&safe_name, now_millis());
    let size = data.len();

    let st = storage.clone();
    let name = storage_name.clone();
    blocking(move || {
        st.ensure_root_exists()?;
        st.write(&name, &data)
    })
    .await?;
    log::info!("stored upload {original_name:?} as {storage_name} ({size} bytes)");

    Ok(HttpResponse::Ok().json(UploadResp {
        success: true,
        message: "File uploaded successfully".into(),
        file_name: storage_name,
        original_name,
        size,
    }))
}

#[derive(Serialize)]
pub struct ListResp {
    pub success: bool,
    pub files: Vec<StoredFile>,
}

pub async fn list_files(storage: web::Data<Storage>) -> Result<HttpResponse, ApiError> {
    let st = storage.clone();
    let entries = blocking(move || st.list()).await?;

    let mut files: Vec<StoredFile> = entries.into_iter().map(StoredFile::from).collect();
    // newest first; sort_by is stable so ties keep enumeration order
    files.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(HttpResponse::Ok().json(ListResp {
        success: true,
        files,
    }))
}

pub async fn download_file(
    storage: web::Data<Storage>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let storage_name = path.into_inner();
    let st = storage.clone();
    let name = storage_name.clone();
    let data = blocking(move || st.read(&name)).await?;
    let display_name = naming::display_name_of(&storage_name);

    // non-ascii names also go out as RFC 5987 `filename*`
    let mut parameters = vec![DispositionParam::Filename(display_name.clone())];
    if !display_name.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".into()),
            language_tag: None,
            value: display_name.into_bytes(),
        }));
    }

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters,
        })
        .body(data))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReq {
    pub current_file_name: Option<String>,
    pub new_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResp {
    pub success: bool,
    pub message: String,
    pub old_file_name: String,
    pub new_file_name: String,
    pub new_display_name: String,
}

pub async fn rename_file(
    storage: web::Data<Storage>,
    body: web::Json<RenameReq>,
) -> Result<HttpResponse, ApiError> {
    let RenameReq { current_file_name, new_name } = body.into_inner();
    let (current, requested) = match (current_file_name, new_name) {
        (Some(c), Some(n)) if !c.is_empty() && !n.is_empty() => (c, n),
        _ => {
            return Err(ApiError::BadRequest(
                "Current filename and new name are required".into(),
            ));
        }
    };

    let target = naming::rename_target(&current, &requested, now_millis());
    if target.storage_name.len() > naming::MAX_NAME_BYTES {
        return Err(ApiError::BadRequest("New name is too long".into()));
    }
    let st = storage.clone();
    let (old, new) = (current.clone(), target.storage_name.clone());
    blocking(move || st.rename(&old, &new)).await?;
    log::info!("renamed {current} to {}", target.storage_name);

    Ok(HttpResponse::Ok().json(RenameResp {
        success: true,
        message: "File renamed successfully".into(),
        old_file_name: current,
        new_file_name: target.storage_name,
        new_display_name: target.display_name,
    }))
}
