//! Guide request value objects.

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;

/// The shape of answer the player wants back.
///
/// Each style selects a different system prompt for the generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStyle {
    /// The single immediate action to take right now.
    #[default]
    NextStep,
    /// A strategic breakdown of the current section.
    Strategic,
    /// Where the player stands in the overall progression.
    Positioning,
    /// Useful tips, tricks, and secrets for this part of the game.
    TipsAndTricks,
}

impl OutputStyle {
    /// Stable lowercase name, used in logs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NextStep => "next_step",
            Self::Strategic => "strategic",
            Self::Positioning => "positioning",
            Self::TipsAndTricks => "tips_and_tricks",
        }
    }
}

impl std::fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single guide-generation request, immutable once built.
///
/// Captures what the player told us about their game and where they are
/// stuck. Game title and situation are mandatory; everything else refines
/// the answer. Construction trims whitespace and rejects empty required
/// fields, so the pipeline never sees a blank request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideRequest {
    game_title: String,
    situation: String,
    objective: Option<String>,
    style: OutputStyle,
    custom_instruction: Option<String>,
}

impl GuideRequest {
    /// Creates a request from the two mandatory fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the game title or the
    /// situation is empty after trimming.
    pub fn new(
        game_title: impl Into<String>,
        situation: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let game_title = game_title.into().trim().to_string();
        let situation = situation.into().trim().to_string();

        if game_title.is_empty() {
            return Err(ValidationError::empty_field("game_title"));
        }
        if situation.is_empty() {
            return Err(ValidationError::empty_field("situation"));
        }

        Ok(Self {
            game_title,
            situation,
            objective: None,
            style: OutputStyle::default(),
            custom_instruction: None,
        })
    }

    /// Sets the player's stated objective. Blank input clears it.
    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        let objective = objective.into().trim().to_string();
        self.objective = (!objective.is_empty()).then_some(objective);
        self
    }

    /// Sets the output style.
    pub fn with_style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets a free-form instruction that overrides the style's task text.
    /// Blank input clears it.
    pub fn with_custom_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into().trim().to_string();
        self.custom_instruction = (!instruction.is_empty()).then_some(instruction);
        self
    }

    pub fn game_title(&self) -> &str {
        &self.game_title
    }

    pub fn situation(&self) -> &str {
        &self.situation
    }

    pub fn objective(&self) -> Option<&str> {
        self.objective.as_deref()
    }

    pub fn style(&self) -> OutputStyle {
        self.style
    }

    pub fn custom_instruction(&self) -> Option<&str> {
        self.custom_instruction.as_deref()
    }
}
