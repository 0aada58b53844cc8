use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// One entry of the supported translation languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub name_native: &'static str,
    pub flag: &'static str,
    pub direction: TextDirection,
}

/// The supported set. Adding a language here is enough for the selectors
/// and the simulated translator to pick it up.
pub static LANGUAGES: [LanguageOption; 2] = [
    LanguageOption {
        code: "en",
        name: "English",
        name_native: "English",
        flag: "\u{1F1FA}\u{1F1F8}",
        direction: TextDirection::Ltr,
    },
    LanguageOption {
        code: "ar",
        name: "Arabic",
        name_native: "\u{0627}\u{0644}\u{0639}\u{0631}\u{0628}\u{064A}\u{0629}",
        flag: "\u{1F1F8}\u{1F1E6}",
        direction: TextDirection::Rtl,
    },
];

pub fn supported_languages() -> &'static [LanguageOption] {
    &LANGUAGES
}

/// Case-insensitive lookup by two-letter code.
pub fn find_language(code: &str) -> Option<&'static LanguageOption> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|language| language.code.eq_ignore_ascii_case(code))
}

/// Ordered (source, target) pair chosen for one workflow instance. Equal
/// source and target are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguagePair {
    pub source: &'static LanguageOption,
    pub target: &'static LanguageOption,
}

impl LanguagePair {
    pub fn new(source: &'static LanguageOption, target: &'static LanguageOption) -> Self {
        Self { source, target }
    }

    /// Resolve a pair from codes, returning the first unknown code on failure.
    pub fn from_codes(source: &str, target: &str) -> Result<Self, String> {
        let source_option = find_language(source).ok_or_else(|| source.to_string())?;
        let target_option = find_language(target).ok_or_else(|| target.to_string())?;
        Ok(Self::new(source_option, target_option))
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    pub fn swapped(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(&LANGUAGES[0], &LANGUAGES[1])
    }
}
