//! Prompt playback — the [`Speaker`] trait and the system-command backend.
//!
//! Speech synthesis goes through whatever the host OS provides, tried in a
//! fallback chain:
//!
//! | Platform | Backends (in order)                  |
//! |----------|--------------------------------------|
//! | macOS    | `say`                                |
//! | Windows  | PowerShell + System.Speech           |
//! | other    | `spd-say`, then `espeak`             |
//!
//! Playback is blocking; the caller decides whether to move it off its
//! interaction thread.

use std::process::Command;

use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors from the playback subsystem.
#[derive(Debug, Error)]
pub enum TtsError {
    /// None of the platform backends could be launched.
    #[error("no TTS backend available")]
    NoBackend,

    /// A backend ran but reported failure.
    #[error("TTS command failed: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Speaker trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speaking a prompt sentence aloud.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), TtsError>;
}

// ---------------------------------------------------------------------------
// SystemSpeaker
// ---------------------------------------------------------------------------

/// Speaks through the host system's own TTS command, with per-platform
/// fallbacks.
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    voice: Option<String>,
    rate: u32,
}

impl SystemSpeaker {
    pub fn new(voice: Option<String>, rate: u32) -> Self {
        Self { voice, rate }
    }

    pub fn from_config(config: &TtsConfig) -> Self {
        Self::new(config.voice.clone(), config.rate)
    }

    #[cfg(target_os = "macos")]
    fn speak_platform(&self, text: &str) -> Result<(), TtsError> {
        let mut cmd = Command::new("say");
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("-r").arg(self.rate.to_string()).arg(text);
        run_backend(cmd, "say")
    }

    #[cfg(target_os = "windows")]
    fn speak_platform(&self, text: &str) -> Result<(), TtsError> {
        // System.Speech has no simple rate/voice flags worth the escaping
        // risk here; keep the invocation minimal.
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
            powershell_escape(text)
        );
        run_backend(
            {
                let mut cmd = Command::new("powershell");
                cmd.arg("-Command").arg(script);
                cmd
            },
            "powershell",
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn speak_platform(&self, text: &str) -> Result<(), TtsError> {
        let mut spd = Command::new("spd-say");
        spd.arg("--wait").arg(text);
        if run_backend(spd, "spd-say").is_ok() {
            return Ok(());
        }

        let mut espeak = Command::new("espeak");
        if let Some(voice) = &self.voice {
            espeak.arg("-v").arg(voice);
        }
        espeak.arg("-s").arg(self.rate.to_string()).arg(text);
        run_backend(espeak, "espeak").map_err(|_| TtsError::NoBackend)
    }
}

impl Speaker for SystemSpeaker {
    fn speak(&self, text: &str) -> Result<(), TtsError> {
        log::debug!("speaking prompt ({} chars)", text.len());
        self.speak_platform(text)
    }
}

/// Run one backend command; spawn failure or a non-zero exit is an error.
fn run_backend(mut cmd: Command, name: &str) -> Result<(), TtsError> {
    match cmd.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(TtsError::Backend(format!("{name} exited with {status}"))),
        Err(e) => Err(TtsError::Backend(format!("{name} failed to start: {e}"))),
    }
}

/// Escape a string for a single-quoted PowerShell literal (quotes double).
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn powershell_escape(text: &str) -> String {
    text.replace('\'', "''")
}

// ---------------------------------------------------------------------------
// MockSpeaker  (test-only)
// ---------------------------------------------------------------------------

/// Records spoken text instead of producing audio.
#[cfg(test)]
pub struct MockSpeaker {
    pub spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSpeaker {
    pub fn new() -> Self {
        Self {
            spoken: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl Speaker for MockSpeaker {
    fn speak(&self, text: &str) -> Result<(), TtsError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powershell_escaping_doubles_single_quotes() {
        assert_eq!(powershell_escape("don't"), "don''t");
        assert_eq!(powershell_escape("plain"), "plain");
    }

    #[test]
    fn mock_records_spoken_text() {
        let speaker = MockSpeaker::new();
        speaker.speak("Turn left heading 090.").unwrap();
        assert_eq!(
            speaker.spoken.lock().unwrap().as_slice(),
            ["Turn left heading 090."]
        );
    }

    #[test]
    fn speaker_is_object_safe() {
        let speaker: Box<dyn Speaker> = Box::new(MockSpeaker::new());
        let _ = speaker.speak("test");
    }
}
