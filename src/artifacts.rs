//! Writing generated media to the output directory.

use crate::error::Result;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Build `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.<ext>` from the local clock.
pub fn timestamped_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.{}", prefix, stamp, ext))
}

/// Write raw bytes, creating the directory if needed.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Paths of a saved video and its HTML viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoArtifacts {
    pub video: PathBuf,
    pub playground: PathBuf,
}

/// Save an mp4 and a companion HTML page that plays it.
pub async fn save_video(dir: &Path, prompt: &str, bytes: &[u8]) -> Result<VideoArtifacts> {
    let video = timestamped_path(dir, "video", "mp4");
    write_bytes(&video, bytes).await?;

    let playground = video.with_extension("html");
    let file_name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tokio::fs::write(&playground, playground_html(prompt, &file_name)).await?;

    Ok(VideoArtifacts { video, playground })
}

/// HTML page showing the prompt and an autoplaying `<video>` for `video_file`.
pub fn playground_html(prompt: &str, video_file: &str) -> String {
    format!(
        "<html><head><title>Video Playground</title></head>\
<body style='background:#111;color:#eee;font-family:sans-serif'>\
<h3>Prompt</h3><pre style='white-space:pre-wrap'>{}</pre>\
<h3>Video</h3>\
<video src='{}' controls autoplay style='max-width:100%;border:1px solid #444'></video>\
</body></html>",
        escape_html(prompt),
        escape_html(video_file)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_path_shape() {
        let path = timestamped_path(Path::new("/tmp/out"), "narration", "wav");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("narration_"));
        assert!(name.ends_with(".wav"));
        // narration_ + 8 digits + _ + 6 digits + .wav
        assert_eq!(name.len(), "narration_".len() + 15 + ".wav".len());
    }

    #[test]
    fn test_playground_escapes_prompt() {
        let html = playground_html("<script>alert('x')</script> & more", "video_1.mp4");
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
        assert!(html.contains("<video src='video_1.mp4'"));
    }

    #[tokio::test]
    async fn test_save_video_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_video(dir.path(), "a calm sea", b"fake-mp4").await.unwrap();

        assert_eq!(std::fs::read(&saved.video).unwrap(), b"fake-mp4");
        let html = std::fs::read_to_string(&saved.playground).unwrap();
        assert!(html.contains("a calm sea"));
        assert_eq!(saved.playground.extension().unwrap(), "html");
    }
}
