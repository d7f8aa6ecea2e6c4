//! Model instruction value object

/// Instruction for classifying plain text
const TEXT_INSTRUCTION: &str = "You are a hate speech detection system. Classify the given text into exactly one category.

Categories:
- Hate Speech: attacks, dehumanizes, or incites harm against a person or group based on identity
- Offensive Language: profanity, insults, or vulgarity without identity-based hate
- Normal Speech: everything else

Rules:
- Choose exactly one label from the three categories
- Report a confidence between 0.0 and 1.0
- Give a one or two sentence explanation for the decision
- If the input is gibberish, only numbers, or only punctuation, classify it as Normal Speech with low confidence";

/// Instruction for classifying spoken audio
const AUDIO_INSTRUCTION: &str = "You are a hate speech detection system. Transcribe the given audio, then classify what was said into exactly one category.

Categories:
- Hate Speech: attacks, dehumanizes, or incites harm against a person or group based on identity
- Offensive Language: profanity, insults, or vulgarity without identity-based hate
- Normal Speech: everything else

Rules:
- Transcribe the speech verbatim and include it in the transcription field
- Classify the transcribed content, not the audio quality
- Choose exactly one label and report a confidence between 0.0 and 1.0
- Give a one or two sentence explanation for the decision
- If the audio is silent or unintelligible, classify it as Normal Speech and say so in the explanation
- If the audio cuts off, classify from the part you can hear";

/// Instruction for summarizing an uploaded recording
const FILE_ANALYSIS_INSTRUCTION: &str = "You are an audio analysis system. Transcribe the given recording and describe its content.

Rules:
- Transcribe the speech verbatim
- Summarize the content in two or three sentences
- State the speaker's apparent intent in a short phrase
- List the key points as short bullet items";

/// The system-level instruction sent alongside an inference request.
///
/// Picks the wording for the input shape; audio inputs get the
/// transcribe-then-classify variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInstruction {
    text: String,
}

impl ModelInstruction {
    pub fn for_text() -> Self {
        Self {
            text: TEXT_INSTRUCTION.to_string(),
        }
    }

    pub fn for_audio() -> Self {
        Self {
            text: AUDIO_INSTRUCTION.to_string(),
        }
    }

    pub fn for_file_analysis() -> Self {
        Self {
            text: FILE_ANALYSIS_INSTRUCTION.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
