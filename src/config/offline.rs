//! Basic offline phrasebook, consulted only without connectivity

use std::collections::HashMap;

lazy_static::lazy_static! {
    /// phrase (lowercase) -> target language code -> translation
    static ref OFFLINE_DICTIONARY: HashMap<&'static str, HashMap<&'static str, &'static str>> = {
        let entries: [(&str, [(&str, &str); 3]); 4] = [
            ("hello", [("bn", "নমস্কার / হ্যালো"), ("es", "Hola"), ("fr", "Bonjour")]),
            ("thank you", [("bn", "ধন্যবাদ"), ("es", "Gracias"), ("fr", "Merci")]),
            ("help", [("bn", "সাহায্য করুন"), ("es", "Ayuda"), ("fr", "Aide")]),
            ("how are you", [("bn", "কেমন আছেন?"), ("es", "¿Cómo estás?"), ("fr", "Comment ça va?")]),
        ];
        entries
            .into_iter()
            .map(|(phrase, targets)| (phrase, targets.into_iter().collect()))
            .collect()
    };
}

/// Look up a phrase for `target_lang`. The text is matched trimmed and
/// lowercased.
pub fn lookup(text: &str, target_lang: &str) -> Option<&'static str> {
    let key = text.trim().to_lowercase();
    OFFLINE_DICTIONARY
        .get(key.as_str())
        .and_then(|targets| targets.get(target_lang))
        .copied()
}
