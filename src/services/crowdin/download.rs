use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::services::crowdin::client::CrowdinClient;
use crate::services::encoding::{self, EncodingDetectionResult};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DownloadedFile {
    pub path: String,
    pub encoding: EncodingDetectionResult,
}

/// Fetches one translated file into `dir` so the editor can open it.
pub fn download_to_dir(
    client: &CrowdinClient,
    dir: &Path,
    project_id: &str,
    file_id: u64,
    language: &str,
    file_name: &str,
) -> Result<DownloadedFile> {
    let bytes = client.download_file(project_id, file_id, language)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(local_file_name(project_id, language, file_name));
    fs::write(&path, &bytes)?;

    log::info!("downloaded Crowdin file to {}", path.display());
    Ok(DownloadedFile {
        path: path.to_string_lossy().to_string(),
        encoding: encoding::detect_from_bytes(&bytes),
    })
}

/// `<project>-<language>-<basename>`, with anything outside
/// `[A-Za-z0-9 _.-]` replaced so the name is valid on every platform.
pub fn local_file_name(project_id: &str, language: &str, file_name: &str) -> String {
    let base = Path::new(file_name.trim())
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let base = if base.is_empty() { "translation.po" } else { base };

    format!(
        "{}-{}-{}",
        sanitize(project_id),
        sanitize(language),
        sanitize(base)
    )
}

fn sanitize(part: &str) -> String {
    let out: String = part
        .trim()
        .chars()
        .map(|ch| {
            let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
            if ok {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crowdin::client::tests::{signed_in_client, FakeTransport};
    use serde_json::json;

    #[test]
    fn file_name_is_flattened_and_sanitized() {
        assert_eq!(local_file_name("12", "pt-BR", "/src/app.po"), "12-pt-BR-app.po");
        assert_eq!(local_file_name("a/b", "zh:CN", "x?.po"), "a_b-zh_CN-x_.po");
        assert_eq!(local_file_name("12", "cs", ""), "12-cs-translation.po");
    }

    #[test]
    fn downloads_into_directory() {
        let fake = FakeTransport::default();
        fake.reply(200, json!({"data": {"url": "https://cdn.example/f"}}))
            .reply_bytes(200, "msgid \"Save\"\nmsgstr \"Uložit\"\n".as_bytes().to_vec());
        let client = signed_in_client(&fake);
        let dir = tempfile::tempdir().unwrap();

        let file = download_to_dir(&client, &dir.path().join("dl"), "12", 3, "cs", "/src/app.po").unwrap();

        assert!(file.path.ends_with("12-cs-app.po"));
        assert_eq!(
            fs::read_to_string(&file.path).unwrap(),
            "msgid \"Save\"\nmsgstr \"Uložit\"\n"
        );
        assert_eq!(file.encoding.best, "utf-8");
    }
}
