use std::time::Duration;

use ratatui_image::picker::{Capability, Picker, ProtocolType, cap_parser::QueryStdioOptions};

/// What the environment says about the terminal's graphics support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GraphicsHints {
    kitty_window: bool,
    term_kitty: bool,
    iterm: bool,
    tmux: bool,
}

impl GraphicsHints {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());
        let contains = |key: &str, needle: &str| lookup(key).is_some_and(|v| v.contains(needle));

        Self {
            kitty_window: non_blank("KITTY_WINDOW_ID"),
            // KITTY_WINDOW_ID is not forwarded over SSH, TERM is.
            term_kitty: lookup("TERM").is_some_and(|t| t.trim().starts_with("xterm-kitty")),
            iterm: non_blank("ITERM_SESSION_ID")
                || contains("TERM_PROGRAM", "iTerm")
                || contains("LC_TERMINAL", "iTerm"),
            tmux: lookup("TMUX").is_some(),
        }
    }

    fn strong_hint(&self) -> bool {
        self.kitty_window || self.term_kitty || self.iterm
    }

    /// Querying stdio is only worth it when something hints at a graphics
    /// protocol. In tmux the outer terminal is unknown, so ask.
    pub(crate) fn should_query(&self) -> bool {
        self.strong_hint() || self.tmux
    }

    pub(crate) fn query_timeout(&self) -> Duration {
        if self.strong_hint() {
            Duration::from_millis(1500)
        } else if self.tmux {
            // Passthrough may be off; keep startup snappy.
            Duration::from_millis(300)
        } else {
            Duration::ZERO
        }
    }

    fn kitty_supported(&self, picker: &Picker) -> bool {
        if self.iterm {
            return false;
        }
        self.kitty_window
            || picker
                .capabilities()
                .iter()
                .any(|cap| matches!(cap, Capability::Kitty))
    }
}

/// Builds the picker used for cover art. Must run after raw mode is enabled.
pub(crate) fn build_picker(hints: &GraphicsHints) -> Picker {
    ensure_tmux_allow_passthrough(hints);

    let mut picker = if hints.should_query() {
        let mut options = QueryStdioOptions::default();
        options.timeout = hints.query_timeout();
        options.text_sizing_protocol = false;
        Picker::from_query_stdio_with_options(options).unwrap_or_else(|_| Picker::halfblocks())
    } else {
        Picker::halfblocks()
    };
    picker.set_background_color(image::Rgba([255u8, 255u8, 255u8, 255u8]));
    if hints.kitty_supported(&picker) {
        picker.set_protocol_type(ProtocolType::Kitty);
    }
    picker
}

fn ensure_tmux_allow_passthrough(hints: &GraphicsHints) {
    if !hints.tmux {
        return;
    }

    // Best effort; old tmux just leaves covers on halfblocks.
    let _ = std::process::Command::new("tmux")
        .args(["set-option", "-g", "allow-passthrough", "on"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

pub(crate) fn protocol_label(picker: &Picker) -> &'static str {
    match picker.protocol_type() {
        ProtocolType::Halfblocks => "halfblocks",
        ProtocolType::Sixel => "sixel",
        ProtocolType::Kitty => "kitty",
        ProtocolType::Iterm2 => "iterm2",
    }
}
