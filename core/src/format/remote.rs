/// Turn the `origin` remote URL into a browsable GitHub repository URL.
///
/// Handles `https://github.com/owner/repo(.git)` and
/// `git@github.com:owner/repo(.git)`; any other remote gives `None`.
pub fn github_repo_url(remote: &str) -> Option<String> {
    let remote = remote.trim();

    let repo = if let Some(rest) = remote.strip_prefix("https://github.com/") {
        rest
    } else if let Some(rest) = remote.strip_prefix("git@github.com:") {
        rest
    } else {
        return None;
    };

    let repo = repo.strip_suffix(".git").unwrap_or(repo).trim_end_matches('/');
    if repo.is_empty() {
        return None;
    }
    Some(format!("https://github.com/{repo}"))
}

/// Link to a single commit on the repository's web page.
pub fn commit_url(repo_url: &str, commit_id: &str) -> String {
    format!("{}/commit/{}", repo_url.trim_end_matches('/'), commit_id)
}
