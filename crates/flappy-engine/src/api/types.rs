use serde::Serialize;

/// Identifies one in-flight image load.
/// Issued by `Engine::load_assets`; the host echoes it back on completion or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u32);

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by a frame scheduler for a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Snapshot of the engine's play state, as returned by `Engine::game_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub paused: bool,
    pub on: bool,
    pub level: u32,
    pub idle: bool,
}

impl Default for GameState {
    /// Initial state: idle, not playing, not paused, level 0.
    fn default() -> Self {
        Self {
            paused: false,
            on: false,
            level: 0,
            idle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = GameState::default();
        assert!(state.idle);
        assert!(!state.on);
        assert!(!state.paused);
        assert_eq!(state.level, 0);
    }

    #[test]
    fn game_state_serializes_flat() {
        let json = serde_json::to_string(&GameState::default()).unwrap();
        assert_eq!(json, r#"{"paused":false,"on":false,"level":0,"idle":true}"#);
    }

    #[test]
    fn ticket_display() {
        assert_eq!(LoadTicket(7).to_string(), "#7");
    }
}
