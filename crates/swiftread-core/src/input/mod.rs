//! Input abstraction layer.

/// Logical actions consumed by the playback controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReaderCommand {
    TogglePlay,
    Play,
    Pause,
    /// Jump back one step inside the current chapter.
    Rewind,
    /// Jump forward one step inside the current chapter.
    Forward,
    Seek(usize),
    SelectChapter(usize),
    ShowChapters,
    SetWpm(u16),
    /// Signed WPM change, in steps of `settings::WPM_STEP` by convention.
    AdjustWpm(i32),
    ToggleAlignment,
    Quit,
}

impl ReaderCommand {
    /// Parse one line of keyboard input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (head, arg) = match line.split_once(char::is_whitespace) {
            Some((head, arg)) => (head, Some(arg.trim())),
            None => (line, None),
        };

        let command = match (head, arg) {
            ("" | "p" | "space", None) => Self::TogglePlay,
            ("play", None) => Self::Play,
            ("pause", None) => Self::Pause,
            ("h" | "left" | "b", None) => Self::Rewind,
            ("l" | "right" | "f", None) => Self::Forward,
            ("g" | "seek", Some(arg)) => Self::Seek(arg.parse().ok()?),
            ("c" | "chapter", Some(arg)) => {
                let number: usize = arg.parse().ok()?;
                Self::SelectChapter(number.checked_sub(1)?)
            }
            ("c" | "chapters", None) => Self::ShowChapters,
            ("w" | "wpm", Some(arg)) => Self::SetWpm(arg.parse().ok()?),
            ("+", None) => Self::AdjustWpm(i32::from(crate::settings::WPM_STEP)),
            ("-", None) => Self::AdjustWpm(-i32::from(crate::settings::WPM_STEP)),
            ("a" | "align", None) => Self::ToggleAlignment,
            ("q" | "quit", None) => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}
