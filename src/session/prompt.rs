use crate::config::speech_language_name;

use super::event::SpeechRequest;

/// Instruction handed to the speech model. News mode replaces the emotion
/// entirely with a broadcast delivery.
pub fn speech_prompt(request: &SpeechRequest) -> String {
    let language = speech_language_name(&request.target_language);
    if request.news_mode {
        format!(
            "Act as a professional news presenter. Deliver the following {} text with clear articulation, formal tone, perfectly measured pacing, and a crisp broadcast quality: \"{}\"",
            language, request.text
        )
    } else {
        format!(
            "Speak the following {} text with a {} tone: \"{}\"",
            language,
            request.emotion.descriptor().to_lowercase(),
            request.text
        )
    }
}
