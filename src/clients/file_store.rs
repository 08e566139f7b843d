//! 远程文件存储抽象
//!
//! `FileStore` 只暴露最基础的几个能力（按名查找、列目录、下载、上传），
//! 容错的文件名匹配在这里基于这些能力实现，所有存储实现共用。

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AppResult, StoreError};
use crate::models::{RemoteFile, UploadedFile};

/// Google Docs 文档的 MIME 类型，下载时需要导出为纯文本
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";

/// 未找到文件时最多给出的相似文件名数量
const MAX_SUGGESTIONS: usize = 5;
/// 相似度阈值
const SUGGESTION_CUTOFF: f64 = 0.6;

static RE_BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("valid bare id regex"));
static RE_LINK_IDS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"/folders/([A-Za-z0-9_-]{10,})").expect("valid folders regex"),
        Regex::new(r"[?&]id=([A-Za-z0-9_-]{10,})").expect("valid id query regex"),
        Regex::new(r"/file/d/([A-Za-z0-9_-]{10,})").expect("valid file link regex"),
    ]
});

/// 远程文件存储
pub trait FileStore: Send + Sync + 'static {
    /// 按精确文件名在文件夹中查找
    fn find_by_name(
        &self,
        folder_id: &str,
        name: &str,
    ) -> impl Future<Output = AppResult<Option<RemoteFile>>> + Send;

    /// 列出文件夹中的所有文件
    fn list_children(&self, folder_id: &str) -> impl Future<Output = AppResult<Vec<RemoteFile>>> + Send;

    /// 下载文件内容
    fn download(&self, file: &RemoteFile) -> impl Future<Output = AppResult<Vec<u8>>> + Send;

    /// 上传文件到指定文件夹
    fn upload(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> impl Future<Output = AppResult<UploadedFile>> + Send;
}

/// 从文件夹链接或裸 ID 中提取文件夹 ID
///
/// 支持 `/folders/<id>`、`?id=<id>`、`/file/d/<id>` 三种链接形式。
pub fn resolve_folder_id(reference: &str) -> AppResult<String> {
    let s = reference.trim();
    if RE_BARE_ID.is_match(s) {
        return Ok(s.to_string());
    }

    RE_LINK_IDS
        .iter()
        .find_map(|re| re.captures(s))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            StoreError::InvalidFolderReference {
                reference: reference.to_string(),
            }
            .into()
        })
}

/// 文件名归一化：NFKC、NBSP 转空格、合并空白、小写
pub fn normalize_name(name: &str) -> String {
    let composed: String = name.nfkc().collect();
    composed
        .split(|c: char| c.is_whitespace() || c == '\u{00A0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 在文件列表中容错匹配目标文件名
///
/// 先比较归一化后的完整文件名，再忽略 `.txt` 后缀比较。
pub fn match_tolerant<'a>(children: &'a [RemoteFile], name: &str) -> Option<&'a RemoteFile> {
    let target = normalize_name(name);
    if let Some(found) = children.iter().find(|f| normalize_name(&f.name) == target) {
        return Some(found);
    }

    let target_stem = strip_txt(&target);
    children.iter().find(|f| {
        let candidate = normalize_name(&f.name);
        candidate == target_stem || strip_txt(&candidate) == target_stem
    })
}

/// 找出与目标文件名最相近的几个文件名
pub fn close_matches(children: &[RemoteFile], name: &str) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = children
        .iter()
        .map(|f| (strsim::normalized_levenshtein(name, &f.name), f.name.as_str()))
        .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, n)| n.to_string())
        .collect()
}

/// 查找文件并以文本形式下载
///
/// 查找顺序：精确文件名 → 归一化文件名 → 忽略 `.txt` 后缀。
/// 内容按 UTF-8 解码，非法字节替换为 U+FFFD。
pub async fn fetch_text<S: FileStore>(store: &S, folder_id: &str, name: &str) -> AppResult<String> {
    let file = find_file(store, folder_id, name).await?;
    debug!("下载文件: {} (id={}, mime={})", file.name, file.id, file.mime_type);
    let bytes = store.download(&file).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 在文件夹中容错查找文件
pub async fn find_file<S: FileStore>(store: &S, folder_id: &str, name: &str) -> AppResult<RemoteFile> {
    if let Some(file) = store.find_by_name(folder_id, name).await? {
        return Ok(file);
    }

    let children = store.list_children(folder_id).await?;
    if let Some(file) = match_tolerant(&children, name) {
        debug!("文件名容错匹配: '{}' -> '{}'", name, file.name);
        return Ok(file.clone());
    }

    Err(StoreError::FileNotFound {
        name: name.to_string(),
        folder_id: folder_id.to_string(),
        suggestions: close_matches(&children, name),
    }
    .into())
}

fn strip_txt(name: &str) -> &str {
    name.strip_suffix(".txt").unwrap_or(name)
}
