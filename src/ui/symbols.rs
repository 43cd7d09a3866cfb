pub(crate) struct Symbols {
    pub prompt: &'static str,
    pub check: &'static str,
    pub cross: &'static str,
    pub skip: &'static str,
    pub arrow_right: &'static str,
    pub bullet: &'static str,
    pub warning: &'static str,
}

impl Symbols {
    pub fn current() -> &'static Self {
        #[cfg(windows)]
        {
            let is_modern = std::env::var("WT_SESSION").is_ok()
                || std::env::var("TERM_PROGRAM").is_ok()
                || std::env::var("ALACRITTY_WINDOW_ID").is_ok();
            if !is_modern {
                return &ASCII_SYMBOLS;
            }
        }
        &UNICODE_SYMBOLS
    }
}

const UNICODE_SYMBOLS: Symbols = Symbols {
    prompt: "❯",
    check: "✔",
    cross: "✘",
    skip: "○",
    arrow_right: "→",
    bullet: "•",
    warning: "⚠",
};

#[cfg_attr(not(windows), allow(dead_code))]
const ASCII_SYMBOLS: Symbols = Symbols {
    prompt: ">",
    check: "[x]",
    cross: "[!]",
    skip: "[ ]",
    arrow_right: "->",
    bullet: "*",
    warning: "!",
};
