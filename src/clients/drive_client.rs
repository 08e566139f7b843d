/// Google Drive API 客户端
///
/// 封装所有与 Drive v3 REST API 相关的调用逻辑
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::clients::file_store::{FileStore, GOOGLE_DOC_MIME};
use crate::config::Config;
use crate::error::{AppError, AppResult, StoreError};
use crate::models::{RemoteFile, UploadedFile};

const FILE_FIELDS: &str = "files(id, name, mimeType)";
const MULTIPART_BOUNDARY: &str = "prompt_qa_tool_upload_boundary";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

/// Drive 客户端
pub struct DriveClient {
    http: Client,
    api_base_url: String,
    upload_base_url: String,
    access_token: String,
}

impl DriveClient {
    /// 创建新的 Drive 客户端
    ///
    /// 未配置访问令牌时返回错误。
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.google_access_token.is_empty() {
            return Err(StoreError::MissingCredentials.into());
        }

        Ok(Self {
            http: Client::new(),
            api_base_url: config.drive_api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.drive_upload_base_url.trim_end_matches('/').to_string(),
            access_token: config.google_access_token.clone(),
        })
    }

    /// 按查询条件列出文件
    async fn query_files(&self, query: &str, page_size: u32) -> AppResult<Vec<RemoteFile>> {
        let endpoint = format!("{}/files", self.api_base_url);
        debug!("Drive 查询: {}", query);

        let page_size = page_size.to_string();
        let response = self
            .http
            .get(&endpoint)
            .header(AUTHORIZATION, self.bearer())
            .query(&[
                ("q", query),
                ("spaces", "drive"),
                ("fields", FILE_FIELDS),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
                ("corpora", "allDrives"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        let list: FileList = check_status(response, &endpoint)
            .await?
            .json()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        Ok(list.files)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl FileStore for DriveClient {
    async fn find_by_name(&self, folder_id: &str, name: &str) -> AppResult<Option<RemoteFile>> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query_value(name),
            escape_query_value(folder_id)
        );
        let files = self.query_files(&query, 100).await?;
        Ok(files.into_iter().next())
    }

    async fn list_children(&self, folder_id: &str) -> AppResult<Vec<RemoteFile>> {
        let query = format!("'{}' in parents and trashed = false", escape_query_value(folder_id));
        self.query_files(&query, 1000).await
    }

    async fn download(&self, file: &RemoteFile) -> AppResult<Vec<u8>> {
        let (endpoint, query): (String, &[(&str, &str)]) = if file.mime_type == GOOGLE_DOC_MIME {
            (
                format!("{}/files/{}/export", self.api_base_url, file.id),
                &[("mimeType", "text/plain")],
            )
        } else {
            (
                format!("{}/files/{}", self.api_base_url, file.id),
                &[("alt", "media"), ("supportsAllDrives", "true")],
            )
        };

        let response = self
            .http
            .get(&endpoint)
            .header(AUTHORIZATION, self.bearer())
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        let bytes = check_status(response, &endpoint)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> AppResult<UploadedFile> {
        let endpoint = format!("{}/files", self.upload_base_url);
        let metadata = json!({ "name": name, "parents": [folder_id] });
        let body = build_related_body(&metadata.to_string(), mime_type, &data);

        debug!("上传文件 {} ({} 字节) 到文件夹 {}", name, data.len(), folder_id);

        let response = self
            .http
            .post(&endpoint)
            .header(AUTHORIZATION, self.bearer())
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id, name"),
            ])
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        check_status(response, &endpoint)
            .await?
            .json::<UploadedFile>()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))
    }
}

/// 非 2xx 响应转换为错误，携带响应体便于排查
async fn check_status(response: Response, endpoint: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::BadResponse {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    }
    .into())
}

/// Drive 查询语句中的字符串转义
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// 构造 `multipart/related` 上传请求体（元数据 + 文件内容）
fn build_related_body(metadata_json: &str, mime_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata_json.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            meta = metadata_json,
            mime = mime_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
