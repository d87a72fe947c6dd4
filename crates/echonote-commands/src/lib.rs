//! # echonote-commands
//!
//! Voice-command vocabulary and transform instruction lookup.
//!
//! Four fixed tables map lowercase spoken phrases to symbolic commands (tone,
//! format, edit, navigation). A finalized transcript is scanned linearly
//! against the tables in that order and the first substring match wins.
//!
//! Tone, format, and edit commands are rewrites: each (category, command)
//! pair has a fixed imperative instruction sentence that is prepended to the
//! note content to build the generation prompt. Navigation commands are
//! handled locally by the client and never reach the network.

use serde::{Deserialize, Serialize};

/// Category of a voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    Tone,
    Format,
    Edit,
    Navigation,
}

impl CommandCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::Tone => "tone",
            CommandCategory::Format => "format",
            CommandCategory::Edit => "edit",
            CommandCategory::Navigation => "navigation",
        }
    }

    /// Whether commands in this category are forwarded to the transform API.
    pub fn is_transform(&self) -> bool {
        !matches!(self, CommandCategory::Navigation)
    }
}

/// A phrase table hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMatch {
    pub category: CommandCategory,
    /// Symbolic command name, e.g. "passive_aggressive".
    pub command: &'static str,
    /// The phrase that matched, e.g. "passive aggressive".
    pub phrase: &'static str,
}

// =============================================================================
// PHRASE TABLES (spoken phrase -> symbolic command)
// =============================================================================

/// Tone phrases. Scanned first.
pub const TONE_PHRASES: &[(&str, &str)] = &[
    ("formal", "formal"),
    ("casual", "casual"),
    ("passive aggressive", "passive_aggressive"),
    ("impatient", "impatient"),
    ("enthusiastic", "enthusiastic"),
    ("diplomatic", "diplomatic"),
    ("sarcastic", "sarcastic"),
    ("empathetic", "empathetic"),
];

/// Format phrases. Several phrases alias the same command.
pub const FORMAT_PHRASES: &[(&str, &str)] = &[
    ("make this a bullet list", "bullet_list"),
    ("add bullet points", "bullet_list"),
    ("make this a numbered list", "numbered_list"),
    ("add numbers", "numbered_list"),
    ("add heading", "add_heading"),
    ("add subheading", "add_subheading"),
    ("make this bold", "bold"),
    ("make this italic", "italic"),
    ("make this a quote", "quote"),
    ("add a divider", "divider"),
];

/// Edit phrases.
pub const EDIT_PHRASES: &[(&str, &str)] = &[
    ("delete this paragraph", "delete_paragraph"),
    ("delete last paragraph", "delete_last_paragraph"),
    ("move this up", "move_up"),
    ("move this down", "move_down"),
    ("copy this", "copy"),
    ("cut this", "cut"),
    ("paste here", "paste"),
    ("undo", "undo"),
    ("redo", "redo"),
];

/// Navigation phrases. Handled client-side, scanned last.
pub const NAVIGATION_PHRASES: &[(&str, &str)] = &[
    ("go to the beginning", "beginning"),
    ("go to the end", "end"),
    ("scroll up", "scroll_up"),
    ("scroll down", "scroll_down"),
    ("next paragraph", "next_paragraph"),
    ("previous paragraph", "previous_paragraph"),
    ("select all", "select_all"),
];

// =============================================================================
// INSTRUCTION TABLES ((category, command) -> imperative instruction)
// =============================================================================

const TONE_INSTRUCTIONS: &[(&str, &str)] = &[
    ("formal", "Rewrite the following text in a more formal and professional tone, using business-appropriate language while maintaining the original meaning:"),
    ("casual", "Make this text more casual and conversational, as if you're talking to a friend, while keeping the same information:"),
    ("passive_aggressive", "Rewrite this text with a passive-aggressive tone, adding subtle sarcasm and indirectness while maintaining the core message:"),
    ("impatient", "Make this text more direct and to-the-point, as if the writer is in a hurry and wants to get straight to the point:"),
    ("enthusiastic", "Add excitement and energy to this text, making it more enthusiastic and engaging while keeping the same information:"),
    ("diplomatic", "Rewrite this text in a more diplomatic and tactful way, being careful not to offend while maintaining the message:"),
    ("sarcastic", "Add some witty and ironic remarks to this text, making it more sarcastic while keeping the core message:"),
    ("empathetic", "Make this text more understanding and supportive, showing empathy while maintaining the original information:"),
];

const FORMAT_INSTRUCTIONS: &[(&str, &str)] = &[
    ("bullet_list", "Convert the following text into a bullet point list, maintaining the original information:"),
    ("numbered_list", "Convert the following text into a numbered list, maintaining the original information:"),
    ("add_heading", "Add a heading to the following text and format it appropriately:"),
    ("add_subheading", "Add a subheading to the following text and format it appropriately:"),
    ("bold", "Make the following text bold where appropriate, emphasizing key points:"),
    ("italic", "Make the following text italic where appropriate, adding emphasis:"),
    ("quote", "Format the following text as a quote, adding appropriate quotation marks and styling:"),
    ("divider", "Add appropriate dividers or separators to the following text:"),
];

const EDIT_INSTRUCTIONS: &[(&str, &str)] = &[
    ("delete_paragraph", "Remove the last paragraph from the following text:"),
    ("delete_last_paragraph", "Remove the last paragraph from the following text:"),
    ("move_up", "Move the current paragraph up in the following text:"),
    ("move_down", "Move the current paragraph down in the following text:"),
    ("copy", "Copy the following text:"),
    ("cut", "Cut the following text:"),
    ("paste", "Paste the following text:"),
    ("undo", "Undo the last change in the following text:"),
    ("redo", "Redo the last change in the following text:"),
];

/// Look up the fixed instruction for a (category, command) pair.
///
/// Navigation commands have no instruction: they never reach the generator.
pub fn instruction_for(category: CommandCategory, command: &str) -> Option<&'static str> {
    let table = match category {
        CommandCategory::Tone => TONE_INSTRUCTIONS,
        CommandCategory::Format => FORMAT_INSTRUCTIONS,
        CommandCategory::Edit => EDIT_INSTRUCTIONS,
        CommandCategory::Navigation => return None,
    };
    table
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, instruction)| *instruction)
}

/// Build the generation prompt: instruction, blank line, content.
pub fn build_prompt(instruction: &str, content: &str) -> String {
    format!("{}\n\n{}", instruction, content)
}

/// Every (category, command) pair that the transform API accepts.
pub fn transform_commands() -> impl Iterator<Item = (CommandCategory, &'static str)> {
    TONE_INSTRUCTIONS
        .iter()
        .map(|(name, _)| (CommandCategory::Tone, *name))
        .chain(
            FORMAT_INSTRUCTIONS
                .iter()
                .map(|(name, _)| (CommandCategory::Format, *name)),
        )
        .chain(
            EDIT_INSTRUCTIONS
                .iter()
                .map(|(name, _)| (CommandCategory::Edit, *name)),
        )
}

// =============================================================================
// TRANSCRIPT DISPATCH
// =============================================================================

/// Scan a finalized transcript for a command.
///
/// The transcript is lowercased and matched by substring against the four
/// phrase tables in order (tone, format, edit, navigation); the first hit
/// wins. Returns None when nothing matches.
pub fn match_transcript(transcript: &str) -> Option<CommandMatch> {
    let transcript = transcript.to_lowercase();

    let tables = [
        (CommandCategory::Tone, TONE_PHRASES),
        (CommandCategory::Format, FORMAT_PHRASES),
        (CommandCategory::Edit, EDIT_PHRASES),
        (CommandCategory::Navigation, NAVIGATION_PHRASES),
    ];

    for (category, table) in tables {
        for (phrase, command) in table {
            if transcript.contains(phrase) {
                return Some(CommandMatch {
                    category,
                    command,
                    phrase,
                });
            }
        }
    }
    None
}
