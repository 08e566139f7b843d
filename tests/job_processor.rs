use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use prompt_qa_tool::clients::FileStore;
use prompt_qa_tool::error::{AppError, StoreError, ValidationError};
use prompt_qa_tool::models::{RemoteFile, UploadedFile};
use prompt_qa_tool::{AppResult, Config, JobProcessor, JobRequest, OutputMode, HEADERS};

const QA_FOLDER: &str = "qaFolder0001";
const LLM_FOLDER: &str = "llmFolder0001";
const OUT_FOLDER: &str = "outFolder0001";

#[derive(Debug, Clone)]
struct Upload {
    folder_id: String,
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// 内存文件存储
#[derive(Default)]
struct MemoryStore {
    files: Mutex<Vec<(String, RemoteFile, Vec<u8>)>>,
    uploads: Mutex<Vec<Upload>>,
    /// 下载该文件时永远挂起；任务被取消时 Sender 随之释放
    stalled: Mutex<Option<(String, oneshot::Sender<()>)>>,
}

impl MemoryStore {
    fn add(&self, folder_id: &str, name: &str, content: &str) {
        self.add_with_mime(folder_id, name, "text/plain", content);
    }

    fn add_with_mime(&self, folder_id: &str, name: &str, mime_type: &str, content: &str) {
        let mut files = self.files.lock().unwrap();
        let file = RemoteFile {
            id: format!("file-{}", files.len()),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        };
        files.push((folder_id.to_string(), file, content.as_bytes().to_vec()));
    }

    /// 让指定文件的下载挂起，返回的 Receiver 在挂起的任务被丢弃后结束
    fn stall_download(&self, name: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        *self.stalled.lock().unwrap() = Some((name.to_string(), tx));
        rx
    }

    fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl FileStore for MemoryStore {
    async fn find_by_name(&self, folder_id: &str, name: &str) -> AppResult<Option<RemoteFile>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(folder, file, _)| folder == folder_id && file.name == name)
            .map(|(_, file, _)| file.clone()))
    }

    async fn list_children(&self, folder_id: &str) -> AppResult<Vec<RemoteFile>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|(folder, _, _)| folder == folder_id)
            .map(|(_, file, _)| file.clone())
            .collect())
    }

    async fn download(&self, file: &RemoteFile) -> AppResult<Vec<u8>> {
        let stalled = {
            let mut slot = self.stalled.lock().unwrap();
            let hit = slot.as_ref().is_some_and(|(name, _)| *name == file.name);
            if hit {
                slot.take()
            } else {
                None
            }
        };
        if let Some(_held) = stalled {
            std::future::pending::<()>().await;
        }

        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(_, f, _)| f.id == file.id)
            .map(|(_, _, data)| data.clone())
            .unwrap_or_default())
    }

    async fn upload(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> AppResult<UploadedFile> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(Upload {
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        });
        Ok(UploadedFile {
            id: format!("upload-{}", uploads.len()),
            name: name.to_string(),
        })
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::default();
    store.add(QA_FOLDER, "guide_a.txt", "# QA guide A\nSec::Tone::Formal::1\nSec::Length::500\n");
    store.add(LLM_FOLDER, "out_a.txt", "Sec::Tone::Casual::1\nSec::Length::500::2\nSec::Extra::x\n");
    store.add(QA_FOLDER, "guide_b.txt", "Sec::Audience::Adults::4\n");
    store.add(LLM_FOLDER, "out_b.txt", "Sec::Audience:: Adults ::4\n");
    Arc::new(store)
}

fn processor(store: &Arc<MemoryStore>, mode: OutputMode, max_concurrent_pairs: usize) -> JobProcessor<MemoryStore> {
    let config = Config {
        output_mode: mode,
        max_concurrent_pairs,
        ..Config::default()
    };
    JobProcessor::new(Arc::clone(store), &config)
}

fn request(mapping: &str) -> JobRequest {
    JobRequest {
        qa_guides_folder: format!("https://drive.google.com/drive/folders/{}", QA_FOLDER),
        llm_outputs_folder: LLM_FOLDER.to_string(),
        output_folder: format!("https://drive.google.com/open?id={}", OUT_FOLDER),
        mapping_csv: mapping.as_bytes().to_vec(),
    }
}

fn csv_lines(data: &[u8]) -> Vec<String> {
    String::from_utf8(data.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_combined_output_keeps_mapping_order() {
    let store = seeded_store();
    let result = processor(&store, OutputMode::Combined, 4)
        .run(request("qa_name,llm_name\nguide_b.txt,out_b.txt\nguide_a.txt,out_a.txt\n"))
        .await
        .unwrap();

    assert_eq!(result.outputs.len(), 1);
    assert_eq!(result.outputs[0].row, 1);
    assert_eq!(result.outputs[0].csv_file_id, "upload-1");
    assert!(result.outputs[0].csv_file_name.starts_with("prompt_qa_tool_output_"));
    assert!(result.outputs[0].csv_file_name.ends_with(".csv"));

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].folder_id, OUT_FOLDER);
    assert_eq!(uploads[0].mime_type, "text/csv");

    let lines = csv_lines(&uploads[0].data);
    assert_eq!(lines[0], HEADERS.join(","));
    assert_eq!(
        &lines[1..],
        &[
            "guide_b.txt,out_b.txt,Audience,Adults,Adults,True,4,4,True".to_string(),
            "guide_a.txt,out_a.txt,Length,500,500,True,,2,False".to_string(),
            "guide_a.txt,out_a.txt,Tone,Formal,Casual,False,1,1,True".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_per_pair_output() {
    let store = seeded_store();
    let result = processor(&store, OutputMode::PerPair, 1)
        .run(request("guide_a.txt,out_a.txt\nguide_b.txt,out_b.txt\n"))
        .await
        .unwrap();

    let rows: Vec<(usize, &str)> = result
        .outputs
        .iter()
        .map(|o| (o.row, o.csv_file_name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![(1, "guide_a__qa_vs_llm.csv"), (2, "guide_b__qa_vs_llm.csv")]
    );

    let uploads = store.uploads();
    let first = csv_lines(&uploads[0].data);
    assert_eq!(first.len(), 3);
    assert_eq!(first[0], HEADERS.join(","));
    let second = csv_lines(&uploads[1].data);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_tolerant_file_names() {
    let store = MemoryStore::default();
    store.add(QA_FOLDER, "QA\u{00A0}Guide One.txt", "S::A::1::3\n");
    store.add_with_mime(
        LLM_FOLDER,
        "LLM Output One",
        "application/vnd.google-apps.document",
        "S::A::1::3\n",
    );
    let store = Arc::new(store);

    processor(&store, OutputMode::Combined, 2)
        .run(request("qa guide one,llm output one.txt\n"))
        .await
        .unwrap();

    let lines = csv_lines(&store.uploads()[0].data);
    assert_eq!(lines[1], "qa guide one,llm output one.txt,A,1,1,True,3,3,True");
}

#[tokio::test]
async fn test_empty_mapping_is_rejected() {
    let store = seeded_store();
    let err = processor(&store, OutputMode::Combined, 2)
        .run(request("qa,llm\n , \n"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ValidationError::EmptyMapping)));
    assert!(store.uploads().is_empty());
}

#[tokio::test]
async fn test_row_missing_name_is_rejected() {
    let store = seeded_store();
    let err = processor(&store, OutputMode::Combined, 2)
        .run(request("guide_a.txt,out_a.txt\n,out_b.txt\n"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Row 2 missing qa_name/llm_name");
    assert!(store.uploads().is_empty());
}

#[tokio::test]
async fn test_bad_folder_reference() {
    let store = seeded_store();
    let mut req = request("guide_a.txt,out_a.txt\n");
    req.output_folder = "not a folder".to_string();

    let err = processor(&store, OutputMode::Combined, 2).run(req).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::InvalidFolderReference { .. })
    ));
}

#[tokio::test]
async fn test_missing_file_fails_whole_job() {
    let store = seeded_store();
    let err = processor(&store, OutputMode::Combined, 2)
        .run(request("guide_a.txt,out_a.txt\nguide_c.txt,out_b.txt\n"))
        .await
        .unwrap_err();

    match err {
        AppError::Store(StoreError::FileNotFound { name, suggestions, .. }) => {
            assert_eq!(name, "guide_c.txt");
            assert!(suggestions.contains(&"guide_a.txt".to_string()));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(store.uploads().is_empty());
}

#[tokio::test]
async fn test_many_pairs_with_single_permit_stay_ordered() {
    let store = MemoryStore::default();
    let mut mapping = String::new();
    for i in 0..12 {
        store.add(QA_FOLDER, &format!("g{:02}.txt", i), &format!("S::P::{}\n", i));
        store.add(LLM_FOLDER, &format!("o{:02}.txt", i), &format!("S::P::{}\n", i));
        mapping.push_str(&format!("g{:02}.txt,o{:02}.txt\n", i, i));
    }
    let store = Arc::new(store);

    processor(&store, OutputMode::Combined, 1)
        .run(request(&mapping))
        .await
        .unwrap();

    let lines = csv_lines(&store.uploads()[0].data);
    assert_eq!(lines.len(), 13);
    for (i, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("g{:02}.txt,o{:02}.txt,P,{},", i, i)));
    }
}

#[tokio::test]
async fn test_failed_job_cancels_remaining_pairs() {
    let store = seeded_store();
    let released = store.stall_download("guide_a.txt");

    let err = processor(&store, OutputMode::Combined, 2)
        .run(request("guide_a.txt,out_a.txt\nguide_c.txt,out_b.txt\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(StoreError::FileNotFound { .. })));

    // 挂起的下载任务被取消后，Sender 被丢弃，Receiver 立即结束
    let outcome = tokio::time::timeout(Duration::from_secs(1), released).await;
    assert!(outcome.is_ok(), "stalled pair was left running");
    assert!(store.uploads().is_empty());
}
