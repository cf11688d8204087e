//! Static catalog of languages, voices and speaking styles

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language the translator offers in its pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 code (e.g., "en", "bn")
    pub code: &'static str,
    /// Display name for pickers
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "bn", name: "Bengali (বাংলা)" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ar", name: "Arabic" },
];

pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Display name used in translation prompts. Codes outside the picker list
/// fall back to isolang, then to the raw code.
pub fn language_display_name(code: &str) -> String {
    if let Some(lang) = find_language(code) {
        return lang.name.to_string();
    }
    english_name(code).unwrap_or_else(|| code.to_string())
}

/// Plain English name of a language, used to tell the speech model what it
/// is reading (e.g., "Bengali" rather than "Bengali (বাংলা)")
pub fn speech_language_name(code: &str) -> String {
    english_name(code)
        .or_else(|| find_language(code).map(|l| l.name.to_string()))
        .unwrap_or_else(|| "English".to_string())
}

fn english_name(code: &str) -> Option<String> {
    isolang::Language::from_639_1(&code.to_lowercase()).map(|l| {
        // isolang names can carry qualifiers ("Spanish; Castilian")
        l.to_name()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    })
}

// --- GENDER ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Female voices ship in the catalog but are switched off in this release
    pub fn is_enabled(self) -> bool {
        matches!(self, Gender::Male)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

// --- VOICES ---

/// A Gemini prebuilt voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub gender: Gender,
}

pub const VOICES: &[Voice] = &[
    Voice { name: "Puck", label: "Puck", description: "Bright & Playful", gender: Gender::Male },
    Voice { name: "Charon", label: "Charon", description: "Deep & Authoritative", gender: Gender::Male },
    Voice { name: "Fenrir", label: "Fenrir", description: "Warm & Natural", gender: Gender::Male },
    Voice { name: "Aoede", label: "Aoede", description: "Breezy & Clear", gender: Gender::Female },
    Voice { name: "Kore", label: "Kore", description: "Firm & Steady", gender: Gender::Female },
    Voice { name: "Leda", label: "Leda", description: "Youthful & Light", gender: Gender::Female },
];

pub fn voices_for(gender: Gender) -> impl Iterator<Item = &'static Voice> {
    VOICES.iter().filter(move |v| v.gender == gender)
}

pub fn find_voice(name: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.name.eq_ignore_ascii_case(name))
}

// --- EMOTION ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Excited,
    Angry,
    Whisper,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Excited,
        Emotion::Angry,
        Emotion::Whisper,
    ];

    /// Tone descriptor embedded in the speech prompt
    pub fn descriptor(self) -> &'static str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Happy => "Happy & Cheerful",
            Emotion::Sad => "Sad & Emotional",
            Emotion::Excited => "Excited & Energetic",
            Emotion::Angry => "Angry & Serious",
            Emotion::Whisper => "Soft & Whispering",
        }
    }

    /// Accepts either the variant name ("happy") or the full descriptor
    pub fn parse(input: &str) -> Option<Emotion> {
        let needle = input.trim();
        Self::ALL.into_iter().find(|e| {
            format!("{:?}", e).eq_ignore_ascii_case(needle) || e.descriptor().eq_ignore_ascii_case(needle)
        })
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}
