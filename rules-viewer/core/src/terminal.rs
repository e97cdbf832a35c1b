/// Terminal programs known to render emoji status symbols.
const KNOWN_TERMINALS: [&str; 10] = [
    "iterm",
    "apple_terminal",
    "vscode",
    "wezterm",
    "hyper",
    "alacritty",
    "kitty",
    "ghostty",
    "tabby",
    "warpterminal",
];

/// A pair of status symbols.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub success: &'static str,
    pub failure: &'static str,
}

/// The environment signals that describe the terminal's capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerminalEnv {
    /// `TERM_PROGRAM`
    pub program: String,
    /// `COLORTERM`
    pub color: String,
    /// `TERM`
    pub term: String,
}

// === impl Glyphs ===

impl Glyphs {
    pub const UNICODE: Self = Self {
        success: "✅",
        failure: "❌",
    };

    pub const ASCII: Self = Self {
        success: "[+]",
        failure: "[!]",
    };

    /// Picks the Unicode pair if the terminal is known to render it.
    pub fn detect(env: &TerminalEnv) -> Self {
        let program = env.program.to_ascii_lowercase();
        let color = env.color.to_ascii_lowercase();
        if KNOWN_TERMINALS.iter().any(|t| program.contains(t))
            || color == "truecolor"
            || color == "24bit"
            || env.term.contains("xterm-256color")
        {
            Self::UNICODE
        } else {
            Self::ASCII
        }
    }

    #[inline]
    pub fn status(&self, passed: bool) -> &'static str {
        if passed {
            self.success
        } else {
            self.failure
        }
    }
}

// === impl TerminalEnv ===

impl TerminalEnv {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            program: var("TERM_PROGRAM"),
            color: var("COLORTERM"),
            term: var("TERM"),
        }
    }
}
