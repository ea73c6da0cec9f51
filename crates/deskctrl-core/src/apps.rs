//! Static lookup of known applications and their display-name variants.
//!
//! One canonical app identity resolves to the display names it is known
//! under across languages and OS versions. Fixed at compile time; a contract
//! that needs more writes its own titleContains/titleRegex instead.

/// A canonical application identity with its known display-name aliases.
pub struct KnownApp {
    pub id: &'static str,
    pub aliases: &'static [&'static str],
}

pub const KNOWN_APPS: &[KnownApp] = &[
    KnownApp {
        id: "notepad",
        aliases: &["Notepad", "Editor", "Bloc de notas", "Bloc-notes", "メモ帳", "记事本"],
    },
    KnownApp {
        id: "calculator",
        aliases: &["Calculator", "Rechner", "Calculadora", "Calculatrice", "電卓", "计算器"],
    },
    KnownApp {
        id: "explorer",
        aliases: &["File Explorer", "Explorer", "Explorador de archivos", "エクスプローラー"],
    },
    KnownApp {
        id: "paint",
        aliases: &["Paint", "ペイント", "画图"],
    },
    KnownApp {
        id: "wordpad",
        aliases: &["WordPad", "ワードパッド"],
    },
];

/// Look up a canonical app by id (case-insensitive).
pub fn by_id(id: &str) -> Option<&'static KnownApp> {
    KNOWN_APPS.iter().find(|a| a.id.eq_ignore_ascii_case(id))
}

/// Whether a live window title matches any alias of the app.
pub fn title_matches(app: &KnownApp, title: &str) -> bool {
    let title_lower = title.to_lowercase();
    app.aliases.iter().any(|a| title_lower.contains(&a.to_lowercase()))
}
