use crate::{errors::CapabilityError, providers::language::LanguageDetector};
use async_trait::async_trait;

/// Unicode blocks of the Indic scripts the knowledge base serves, with the
/// language each one is taken to mean.
const SCRIPT_BLOCKS: [(char, char, &str); 8] = [
    ('\u{0900}', '\u{097F}', "hi"),
    ('\u{0980}', '\u{09FF}', "bn"),
    ('\u{0A00}', '\u{0A7F}', "pa"),
    ('\u{0A80}', '\u{0AFF}', "gu"),
    ('\u{0B80}', '\u{0BFF}', "ta"),
    ('\u{0C00}', '\u{0C7F}', "te"),
    ('\u{0C80}', '\u{0CFF}', "kn"),
    ('\u{0D00}', '\u{0D7F}', "ml"),
];

/// An offline detector that classifies text by the script most of its letters use.
///
/// Latin letters count as English. Letters from scripts outside the table are
/// ignored; text without any recognised letter is undetectable.
#[derive(Clone, Debug, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    fn classify(text: &str) -> Option<&'static str> {
        let mut counts = [0usize; SCRIPT_BLOCKS.len() + 1];
        for c in text.chars() {
            if c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c) {
                counts[SCRIPT_BLOCKS.len()] += 1;
            } else if let Some(pos) = SCRIPT_BLOCKS
                .iter()
                .position(|(lo, hi, _)| (*lo..=*hi).contains(&c))
            {
                counts[pos] += 1;
            }
        }
        let (best, &count) = counts
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))?;
        if count == 0 {
            return None;
        }
        Some(SCRIPT_BLOCKS.get(best).map_or("en", |(_, _, lang)| *lang))
    }
}

#[async_trait]
impl LanguageDetector for ScriptDetector {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        Self::classify(text)
            .map(String::from)
            .ok_or(CapabilityError::Undetectable)
    }
}
