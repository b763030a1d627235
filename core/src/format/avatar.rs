use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{AvatarStyle, BlameConfig};

const ANIME_COLORS: &[&str] = &[
    "#FF6B35", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#F39C12", "#E74C3C",
    "#00D2FF", "#FF416C", "#FF6B6B", "#4ECDC4", "#A8E6CF", "#FFD93D", "#FF8E53", "#6C5CE7",
    "#FD79A8", "#00B894", "#E17055", "#74B9FF",
];

const GAMING_COLORS: &[&str] = &[
    "#1a1a2e", "#16213e", "#0f3460", "#533483", "#7209b7", "#2C3E50", "#34495E", "#8B0000",
    "#191970", "#2F4F4F",
];

const MINIMAL_COLORS: &[&str] = &["#667eea", "#764ba2", "#f093fb", "#f5576c", "#4facfe", "#00f2fe"];

const GEOMETRIC_COLORS: &[&str] = &["#ff9a9e", "#fecfef", "#a8edea", "#fed6e3", "#ffd93d", "#6c5ce7"];

/// What the host should draw for an author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AvatarSource {
    /// A GitHub profile picture. Hosts should fall back to initials if it fails to load.
    GitHub { url: String },
    /// Initials on a coloured disc.
    Initials {
        initials: String,
        background: String,
        foreground: String,
    },
}

/// Choose an avatar for an author.
///
/// GitHub avatars are only used when enabled and a username can be guessed
/// from the email or name; otherwise a deterministic initials avatar in the
/// configured style.
pub fn select_avatar(name: &str, email: &str, config: &BlameConfig, size: u32) -> AvatarSource {
    if config.use_github_avatars {
        if let Some(username) = github_username(email, name) {
            return AvatarSource::GitHub {
                url: format!("https://github.com/{username}.png?size={size}"),
            };
        }
    }
    initials_avatar(name, config.avatar_style)
}

pub fn initials_avatar(name: &str, style: AvatarStyle) -> AvatarSource {
    let (palette, foreground) = match style {
        AvatarStyle::Anime => (ANIME_COLORS, "#FFFFFF"),
        AvatarStyle::Gaming => (GAMING_COLORS, "#00ff41"),
        AvatarStyle::Minimal => (MINIMAL_COLORS, "#FFFFFF"),
        AvatarStyle::Geometric => (GEOMETRIC_COLORS, "#2c3e50"),
    };
    let background = palette[name_hash(name) as usize % palette.len()];

    AvatarSource::Initials {
        initials: initials(name),
        background: background.to_string(),
        foreground: foreground.to_string(),
    }
}

/// Up to two upper-case initials: the first two characters of a single
/// word, or the first characters of the first and last words.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => "??".to_string(),
        [only] => only.chars().take(2).collect::<String>().to_uppercase(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

/// 32-bit string hash (`h = h * 31 + unit` over UTF-16 units, wrapping),
/// returned as its absolute value so palette picks stay stable across hosts.
pub fn name_hash(name: &str) -> u32 {
    name.encode_utf16()
        .fold(0i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

/// Best-effort GitHub username from an author's email or name.
///
/// Recognizes `user@users.noreply.github.com` and
/// `12345+user@users.noreply.github.com`; otherwise accepts the author name
/// itself when it looks like a handle (no spaces, `[A-Za-z0-9._-]` only).
pub fn github_username(email: &str, name: &str) -> Option<String> {
    static NOREPLY: OnceLock<Regex> = OnceLock::new();
    static HANDLE: OnceLock<Regex> = OnceLock::new();

    let noreply = NOREPLY.get_or_init(|| {
        Regex::new(r"^(?:\d+[+-])?([^+@]+)@users\.noreply\.github\.com$")
            .expect("noreply pattern is valid")
    });
    if let Some(caps) = noreply.captures(email.trim()) {
        return Some(caps[1].to_string());
    }

    let handle =
        HANDLE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("handle pattern is valid"));
    if handle.is_match(name) {
        return Some(name.to_string());
    }

    None
}
