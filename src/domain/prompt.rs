//! Prompt assembly for guide generation.
//!
//! A [`PromptBundle`] is built once per pipeline run from the request and
//! shared by every provider call in that run, so all candidates answer the
//! same question. The system prompt varies with the requested output style;
//! the user prompt carries the player's situation plus the task text.

use serde::{Deserialize, Serialize};

use super::request::{GuideRequest, OutputStyle};

/// The prompts and search query for one run, identical across candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBundle {
    search_query: String,
    system_prompt: String,
    user_prompt: String,
}

impl PromptBundle {
    /// Assembles the bundle from a validated request.
    pub fn from_request(request: &GuideRequest) -> Self {
        let search_query = build_search_query(request);
        let user_prompt = build_user_prompt(request);
        let system_prompt = build_system_prompt(request.style(), &search_query);

        Self {
            search_query,
            system_prompt,
            user_prompt,
        }
    }

    /// Web search query for grounding-capable providers.
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }
}

fn build_search_query(request: &GuideRequest) -> String {
    match request.objective() {
        Some(objective) => format!(
            "{} walkthrough guide {} {}",
            request.game_title(),
            request.situation(),
            objective
        ),
        None => format!(
            "{} walkthrough guide {}",
            request.game_title(),
            request.situation()
        ),
    }
}

fn build_user_prompt(request: &GuideRequest) -> String {
    let main_question = match request.objective() {
        Some(objective) => format!(
            "In the game '{}', the player's current situation is: {}. Their immediate objective is: {}.",
            request.game_title(),
            request.situation(),
            objective
        ),
        None => format!(
            "In the game '{}', the player's current situation is: {}.",
            request.game_title(),
            request.situation()
        ),
    };

    let mut parts = vec![main_question];

    if let Some(instruction) = request.custom_instruction() {
        parts.push(instruction.to_string());
    } else {
        match request.style() {
            OutputStyle::NextStep => {
                parts.push(
                    "Search online game guides and walkthroughs to find: What is the EXACT next step the player should take right now?"
                        .to_string(),
                );
                parts.push(
                    "Provide ONLY the immediate, actionable next step. Be specific and concise."
                        .to_string(),
                );
                parts.push(
                    "If you find conflicting information, provide the most commonly recommended solution."
                        .to_string(),
                );
            }
            OutputStyle::Strategic => {
                parts.push(
                    "Lay out a strategic breakdown of this part of the game: what to prepare, what order to do things in, and what it leads to."
                        .to_string(),
                );
            }
            OutputStyle::Positioning => {
                parts.push(
                    "Explain where the player currently stands in the game's progression and what this section is building toward."
                        .to_string(),
                );
            }
            OutputStyle::TipsAndTricks => {
                parts.push(
                    "Share the most useful tips, tricks, or secrets that apply to this exact part of the game."
                        .to_string(),
                );
            }
        }
    }

    parts.join(" ")
}

fn build_system_prompt(style: OutputStyle, search_query: &str) -> String {
    match style {
        OutputStyle::Strategic => format!(
            r#"You are an expert video game guide assistant. Provide comprehensive strategic guidance based on REAL game walkthroughs and guides found online.

IMPORTANT INSTRUCTIONS:
1. Search the internet for "{search_query}" to find accurate walkthrough information
2. Use ONLY information from actual game guides, walkthroughs, and wikis
3. Provide strategic breakdown with context and planning
4. Be specific with locations, items, or actions
5. Structure your response according to the user's request
6. Do NOT make up information - only use what you find in guides

Focus on accuracy and helpful structure."#
        ),
        OutputStyle::Positioning => format!(
            r#"You are an expert video game guide assistant. Analyze the player's position in the game based on REAL walkthroughs and guides found online.

IMPORTANT INSTRUCTIONS:
1. Search the internet for "{search_query}" to find accurate walkthrough information
2. Use ONLY information from actual game guides, walkthroughs, and wikis
3. Focus on explaining WHERE they are in the game's progression
4. Provide context about what comes before and after
5. Do NOT just tell them what to do next - explain their situation
6. Do NOT make up information - only use what you find in guides

Focus on contextual understanding over direction."#
        ),
        OutputStyle::TipsAndTricks => format!(
            r#"You are an expert video game guide assistant specializing in tips, tricks, and optimization. Provide helpful secrets and strategies based on REAL game guides and community knowledge.

IMPORTANT INSTRUCTIONS:
1. Search the internet for "{search_query}" along with terms like "tips", "tricks", "secrets", "exploits"
2. Use information from game guides, wikis, and community resources
3. Focus on optimization, shortcuts, and advantages
4. Include hidden content and secret techniques
5. Provide practical tips the player can use immediately
6. Do NOT make up information - only use what you find

Focus on giving them an edge."#
        ),
        OutputStyle::NextStep => format!(
            r#"You are an expert video game guide assistant. Your task is to provide accurate, actionable guidance based on REAL game walkthroughs and guides found online.

IMPORTANT INSTRUCTIONS:
1. Search the internet for "{search_query}" to find accurate walkthrough information
2. Use ONLY information from actual game guides, walkthroughs, and wikis
3. Provide the IMMEDIATE next step - not general advice
4. Be specific with locations, items, or actions
5. If multiple solutions exist, mention the most common one
6. Do NOT make up information - only use what you find in guides
7. Keep your response concise (2-3 sentences max)

Focus on accuracy over creativity. The player needs reliable information."#
        ),
    }
}
