use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("Unsupported language: {0}")]
    Unsupported(String),
}

/// Languages accepted for judging.
///
/// The canonical name (`as_str`) is what gets persisted on a submission;
/// `judge_id` is the runtime identifier the execution service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Language {
    #[serde(rename = "c++")]
    Cpp,
    #[serde(rename = "java")]
    Java,
    #[serde(rename = "javascript")]
    JavaScript,
}

/// Colloquial spellings mapped onto canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("c++17", "c++"),
    ("js", "javascript"),
    ("node", "javascript"),
    ("nodejs", "javascript"),
];

impl Language {
    pub fn all_variants() -> &'static [Language] {
        &[Language::Cpp, Language::Java, Language::JavaScript]
    }

    /// Resolve user input to a language.
    ///
    /// Input is trimmed, lowercased and run through the alias table before
    /// being matched against canonical names.
    pub fn resolve(name: &str) -> Result<Language, LanguageError> {
        let normalized = name.trim().to_lowercase();
        let canonical = ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(normalized.as_str());

        Self::all_variants()
            .iter()
            .copied()
            .find(|lang| lang.as_str() == canonical)
            .ok_or_else(|| LanguageError::Unsupported(name.trim().to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "c++",
            Language::Java => "java",
            Language::JavaScript => "javascript",
        }
    }

    /// Judge0 language id (C++ GCC 9.2, Java OpenJDK 13, JavaScript Node 12).
    pub fn judge_id(&self) -> i32 {
        match self {
            Language::Cpp => 54,
            Language::Java => 62,
            Language::JavaScript => 63,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
