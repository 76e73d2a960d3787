//! View mode management for the TUI.


/// Current view of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum ViewMode {
    /// File picker. Shown first, until a file is chosen.
    #[default]
    Open,

    /// Transport, speed and loop controls.
    Player,

    /// Key and command reference.
    Help,
}


impl ViewMode {
    pub fn title( &self ) -> &'static str {
        match self {
            ViewMode::Open => "CHOOSE AUDIO FILE",
            ViewMode::Player => "PLAYER",
            ViewMode::Help => "HELP",
        }
    }


    /// Key hints for the status bar.
    pub fn hint( &self ) -> &'static str {
        match self {
            ViewMode::Open => " [↑↓]Select [Enter]Open [Backspace]Up [~]Home [Esc]Back [/]Cmd [q]Quit ",
            ViewMode::Player => " [Space]Play [←→]Skip [+-]Speed [[ ]]A/B [l]Loop [o]Open [/]Cmd [?]Help [q]Quit ",
            ViewMode::Help => " [↑↓]Scroll [?/Esc]Close ",
        }
    }
}
