use serde::{Deserialize, Serialize};

/// Visual style used for generated (non-GitHub) avatars.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStyle {
    #[default]
    Anime,
    Gaming,
    Minimal,
    Geometric,
}

/// Presentation settings, deserialized from the extension's
/// `gitBlameInline.*` configuration section.
///
/// Nothing here changes what is fetched or cached, only what gets rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BlameConfig {
    pub enabled: bool,
    pub show_author: bool,
    pub show_date: bool,
    pub show_commit: bool,
    pub show_commit_message: bool,
    pub max_author_length: usize,
    pub max_commit_message_length: usize,
    pub show_only_current_line: bool,
    pub show_code_lens: bool,
    #[serde(rename = "useGitHubAvatars")]
    pub use_github_avatars: bool,
    pub avatar_style: AvatarStyle,
}

impl Default for BlameConfig {
    fn default() -> Self {
        BlameConfig {
            enabled: true,
            show_author: true,
            show_date: true,
            show_commit: false,
            show_commit_message: true,
            max_author_length: 20,
            max_commit_message_length: 50,
            show_only_current_line: true,
            show_code_lens: true,
            use_github_avatars: false,
            avatar_style: AvatarStyle::Anime,
        }
    }
}

impl BlameConfig {
    /// Parse the settings JSON handed over by the host. Missing keys take
    /// their defaults; unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(BlameConfig::default());
        }
        serde_json::from_str(json)
    }
}
