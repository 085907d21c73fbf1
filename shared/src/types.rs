/// One listed application.
/// This is the canonical data model used by the catalog, the app-list document and the launch route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Identifier, unique within the catalog, e.g. "12"
    pub id: String,

    /// Display name; may contain colons and markup characters
    pub name: String,

    /// Version tag
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Down,
    Up,
}

/// A single key event. No session or hold duration is tracked: holding a key
/// is a Down followed later by an Up, both issued by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,

    /// Key token as sent by the remote, e.g. "Home"
    pub key: String,

    /// USN of the device that received the event
    pub usn: String,
}

/// Side-effecting request decoded from a control route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Key(KeyEvent),
    Launch { usn: String, app_id: String },
}
