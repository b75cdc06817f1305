use jobmatch_core::config::{ModerationSettings, DEFAULT_BIAS_PHRASES};

/// Flags utterances containing any configured phrase, case-insensitively.
#[derive(Debug, Clone)]
pub struct ModerationGate {
    phrases: Vec<String>,
}

impl ModerationGate {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn from_settings(settings: &ModerationSettings) -> Self { Self::new(&settings.phrases) }

    pub fn is_biased(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }

    pub fn phrases(&self) -> &[String] { &self.phrases }
}

impl Default for ModerationGate {
    fn default() -> Self { Self::new(DEFAULT_BIAS_PHRASES) }
}
