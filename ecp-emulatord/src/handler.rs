use async_trait::async_trait;
use anyhow::Result;
use shared::types::{Command, KeyEvent, KeyEventKind};

/// Key tokens sent by ECP remotes
pub mod keys {
    pub const HOME: &str = "Home";
    pub const REV: &str = "Rev";
    pub const FWD: &str = "Fwd";
    pub const PLAY: &str = "Play";
    pub const SELECT: &str = "Select";
    pub const LEFT: &str = "Left";
    pub const RIGHT: &str = "Right";
    pub const DOWN: &str = "Down";
    pub const UP: &str = "Up";
    pub const BACK: &str = "Back";
    pub const INSTANT_REPLAY: &str = "InstantReplay";
    pub const INFO: &str = "Info";
    pub const BACKSPACE: &str = "Backspace";
    pub const SEARCH: &str = "Search";
    pub const ENTER: &str = "Enter";
    pub const FIND_REMOTE: &str = "FindRemote";
    pub const VOLUME_DOWN: &str = "VolumeDown";
    pub const VOLUME_MUTE: &str = "VolumeMute";
    pub const VOLUME_UP: &str = "VolumeUp";
    pub const POWER_OFF: &str = "PowerOff";
    pub const CHANNEL_UP: &str = "ChannelUp";
    pub const CHANNEL_DOWN: &str = "ChannelDown";
    pub const INPUT_TUNER: &str = "InputTuner";
    pub const INPUT_HDMI1: &str = "InputHDMI1";
    pub const INPUT_HDMI2: &str = "InputHDMI2";
    pub const INPUT_HDMI3: &str = "InputHDMI3";
    pub const INPUT_HDMI4: &str = "InputHDMI4";
    pub const INPUT_AV1: &str = "InputAV1";
}

/// Receives the commands decoded by the control API.
///
/// Every method defaults to a no-op, so implementations only override what
/// they care about. A keypress is delivered on its own and is never split
/// into keydown + keyup. Returning `Err` fails only the request that
/// triggered the call.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn on_keypress(&self, _usn: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn on_keydown(&self, _usn: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn on_keyup(&self, _usn: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn launch(&self, _usn: &str, _app_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Handler that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl CommandHandler for NoopHandler {}

/// Invoke exactly one handler method for `command`.
pub async fn dispatch(handler: &dyn CommandHandler, command: &Command) -> Result<()> {
    match command {
        Command::Key(KeyEvent { kind, key, usn }) => match kind {
            KeyEventKind::Press => handler.on_keypress(usn, key).await,
            KeyEventKind::Down => handler.on_keydown(usn, key).await,
            KeyEventKind::Up => handler.on_keyup(usn, key).await,
        },
        Command::Launch { usn, app_id } => handler.launch(usn, app_id).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every call as (method, usn, token)
    #[derive(Default)]
    pub struct RecordingHandler {
        pub calls: Mutex<Vec<(String, String, String)>>,
        pub fail: bool,
        pub panic: bool,
    }

    impl RecordingHandler {
        pub fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        pub fn panicking() -> Self {
            Self { panic: true, ..Default::default() }
        }

        pub fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, method: &str, usn: &str, token: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), usn.to_string(), token.to_string()));
            if self.panic {
                panic!("handler panicked on {}", method);
            }
            if self.fail {
                anyhow::bail!("handler failed on {}", method);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CommandHandler for RecordingHandler {
        async fn on_keypress(&self, usn: &str, key: &str) -> Result<()> {
            self.record("keypress", usn, key)
        }

        async fn on_keydown(&self, usn: &str, key: &str) -> Result<()> {
            self.record("keydown", usn, key)
        }

        async fn on_keyup(&self, usn: &str, key: &str) -> Result<()> {
            self.record("keyup", usn, key)
        }

        async fn launch(&self, usn: &str, app_id: &str) -> Result<()> {
            self.record("launch", usn, app_id)
        }
    }
}
