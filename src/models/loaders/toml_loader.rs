use crate::error::FileError;
use crate::models::community::CommunityQuiz;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载社区测验
pub async fn load_community_quiz(toml_file_path: &Path) -> Result<CommunityQuiz, FileError> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(&path_str, e))?;

    let quiz: CommunityQuiz =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_str.clone(),
            source,
        })?;

    quiz.validate().map_err(|reason| FileError::Invalid {
        path: path_str.clone(),
        reason,
    })?;

    Ok(quiz.with_file_path(path_str))
}

/// 从文件夹中加载所有社区测验
///
/// 单个文件加载失败只记录警告，不影响其它文件；结果按标题排序
pub async fn load_all_community_quizzes(folder_path: &str) -> Result<Vec<CommunityQuiz>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut quizzes = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::debug!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_community_quiz(&path).await {
                Ok(quiz) => {
                    tracing::debug!("成功加载 {} 个题目", quiz.questions.len());
                    quizzes.push(quiz);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    quizzes.sort_by(|a, b| a.title.cmp(&b.title));

    Ok(quizzes)
}
