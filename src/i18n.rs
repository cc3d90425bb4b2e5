// src/i18n.rs
//
// Lightweight runtime i18n:
// - Built-in tables are embedded at compile time (assets/i18n/<lang>.json
//   via include_str!), so the binary localizes without shipping assets.
// - An on-disk assets/i18n/<lang>.json next to the exe (or in the working
//   dir) overrides the embedded table for that language.
// - Lookup: tr("key") / tr_with("key", [("name", "...")]) with {name}
//   placeholders.
//
// Language selection:
// - CLI: --lang <code> (e.g. en, zh-Hans, ja)
// - Env: FOVVIZ_LANG
// - Default: zh-Hans

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const LANGS: &[(&str, &str)] = &[
    ("zh-Hans", "简体中文"),
    ("en", "English"),
    ("ja", "日本語"),
];

const EMBEDDED: &[(&str, &str)] = &[
    ("zh-Hans", include_str!("../assets/i18n/zh-Hans.json")),
    ("en", include_str!("../assets/i18n/en.json")),
    ("ja", include_str!("../assets/i18n/ja.json")),
];

#[derive(Debug, Clone)]
struct I18n {
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn parse_map(text: &str) -> Option<HashMap<String, String>> {
    serde_json::from_str(text).ok()
}

/// Find an on-disk override at:
/// 1) <exe_dir>/assets/i18n/<lang>.json
/// 2) ./assets/i18n/<lang>.json  (dev working dir)
fn find_override_file(lang: &str) -> Option<PathBuf> {
    let file = format!("{}.json", lang);

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join("i18n").join(&file);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join("i18n").join(&file);
    if p.exists() {
        return Some(p);
    }

    None
}

fn load_file(path: &Path) -> Option<HashMap<String, String>> {
    parse_map(&std::fs::read_to_string(path).ok()?)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    if let Some(p) = find_override_file(lang) {
        if let Some(m) = load_file(&p) {
            return m;
        }
    }

    EMBEDDED
        .iter()
        .find(|(code, _)| *code == lang)
        .and_then(|(_, text)| parse_map(text))
        .unwrap_or_default()
}

/// Initialize global i18n. Safe to call multiple times; later calls
/// overwrite the current language maps.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let fallback_lang = "zh-Hans";

    let map = load_lang(&lang);
    let fallback_map = if lang == fallback_lang {
        map.clone()
    } else {
        load_lang(fallback_lang)
    };

    let i = I18n { map, fallback_map };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

fn get_locked() -> Option<std::sync::RwLockReadGuard<'static, I18n>> {
    I18N.get().and_then(|l| l.read().ok())
}

/// Get localized text by key. If key missing, returns key itself.
pub fn tr(key: &str) -> String {
    let Some(i) = get_locked() else {
        return key.to_string();
    };

    if let Some(v) = i.map.get(key) {
        return v.clone();
    }
    if let Some(v) = i.fallback_map.get(key) {
        return v.clone();
    }
    key.to_string()
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

/// Choose language from CLI/env.
pub fn resolve_lang_from_args() -> String {
    // CLI: --lang <code>
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    // Env: FOVVIZ_LANG
    if let Ok(v) = std::env::var("FOVVIZ_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    "zh-Hans".to_string()
}
