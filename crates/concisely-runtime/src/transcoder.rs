//! `ffmpeg`-backed audio transcoding.

use std::process::Stdio;

use async_trait::async_trait;
use concisely_core::{AudioTranscoder, TranscodeError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Transcodes by piping audio through an `ffmpeg` child process.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    /// `program` is the ffmpeg executable: a name on `PATH` or a full path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn ogg_to_mp3(&self, audio: Vec<u8>) -> Result<Vec<u8>, TranscodeError> {
        let mut child = Command::new(&self.program)
            .args(["-loglevel", "error", "-i", "pipe:0", "-f", "mp3", "pipe:1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranscodeError::Spawn(format!("{}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TranscodeError::Io("stdin was not captured".to_string()))?;

        // Feed stdin while draining stdout, or a full pipe deadlocks both sides
        let input_len = audio.len();
        let write = async move {
            let result = stdin.write_all(&audio).await;
            drop(stdin);
            result
        };
        let (write_result, output) = tokio::join!(write, child.wait_with_output());

        let output = output.map_err(|e| TranscodeError::Io(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TranscodeError::Failed(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            }));
        }
        // A broken pipe only matters if ffmpeg claims success
        write_result.map_err(|e| TranscodeError::Io(e.to_string()))?;

        debug!(
            input_bytes = input_len,
            output_bytes = output.stdout.len(),
            "Transcoded audio to mp3"
        );
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg");
        let err = transcoder.ogg_to_mp3(b"ogg".to_vec()).await.unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn(_)));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        /// Write an executable shell script standing in for ffmpeg.
        fn fake_ffmpeg(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_pipes_large_input_through() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_ffmpeg(&dir, "cat");
            let transcoder = FfmpegTranscoder::new(script.to_string_lossy());

            // Larger than any pipe buffer
            let input: Vec<u8> = (0..2_000_000u32).map(|i| (i % 251) as u8).collect();
            let output = transcoder.ogg_to_mp3(input.clone()).await.unwrap();

            assert_eq!(output, input);
        }

        #[tokio::test]
        async fn test_nonzero_exit_carries_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_ffmpeg(&dir, "echo 'pipe:0: Invalid data found' >&2\nexit 1");
            let transcoder = FfmpegTranscoder::new(script.to_string_lossy());

            let err = transcoder.ogg_to_mp3(b"junk".to_vec()).await.unwrap_err();
            assert!(
                matches!(err, TranscodeError::Failed(ref msg) if msg.contains("Invalid data found"))
            );
        }
    }
}
