//! GitHub release metadata lookups.
use crate::install::VersionSelector;
use crate::logging::Logger;

/// Extract `owner/repo` from a GitHub repository URL.
#[must_use]
pub fn repo_slug(repo_url: &str) -> Option<String> {
    let rest = repo_url
        .strip_prefix("https://github.com/")
        .or_else(|| repo_url.strip_prefix("http://github.com/"))?;
    let rest = rest.trim_end_matches('/').trim_end_matches(".git");
    let mut parts = rest.splitn(2, '/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}

/// Pull `tag_name` out of a release API response.
#[must_use]
pub fn parse_tag_name(json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value
        .get("tag_name")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}

/// Resolve a version selector to a concrete git ref / release tag.
///
/// `Stable` asks the GitHub API for the latest release tag; when that lookup
/// fails (offline, rate limited, not a GitHub URL) it degrades to the
/// literal ref `stable` with a warning, since upstreams commonly maintain a
/// moving `stable` tag.
#[must_use]
pub fn resolve_ref(repo_url: &str, selector: &VersionSelector, log: &Logger) -> String {
    match selector {
        VersionSelector::Nightly => "nightly".to_string(),
        VersionSelector::Tag(tag) => tag.clone(),
        VersionSelector::Stable => match lookup_latest_tag(repo_url) {
            Ok(tag) => {
                log.debug(&format!("latest stable release: {tag}"));
                tag
            }
            Err(e) => {
                log.warn(&format!(
                    "could not resolve latest release ({e}); using 'stable'"
                ));
                "stable".to_string()
            }
        },
    }
}

fn lookup_latest_tag(repo_url: &str) -> anyhow::Result<String> {
    let slug =
        repo_slug(repo_url).ok_or_else(|| anyhow::anyhow!("not a GitHub URL: {repo_url}"))?;
    let url = format!("https://api.github.com/repos/{slug}/releases/latest");
    let response = ureq::get(&url)
        .header("User-Agent", "provision")
        .header("Accept", "application/vnd.github+json")
        .call()?;
    let body = response.into_body().read_to_string()?;
    parse_tag_name(&body).ok_or_else(|| anyhow::anyhow!("no tag_name in release response"))
}

/// Download URL for a release asset.
#[must_use]
pub fn asset_url(repo_url: &str, tag: &str, asset: &str) -> String {
    let base = repo_url.trim_end_matches('/').trim_end_matches(".git");
    format!("{base}/releases/download/{tag}/{asset}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_plain_url() {
        assert_eq!(
            repo_slug("https://github.com/neovim/neovim").as_deref(),
            Some("neovim/neovim")
        );
    }

    #[test]
    fn slug_strips_git_suffix_and_trailing_slash() {
        assert_eq!(
            repo_slug("https://github.com/neovim/neovim.git").as_deref(),
            Some("neovim/neovim")
        );
        assert_eq!(
            repo_slug("https://github.com/neovim/neovim/").as_deref(),
            Some("neovim/neovim")
        );
    }

    #[test]
    fn slug_rejects_non_github_urls() {
        assert!(repo_slug("https://gitlab.com/a/b").is_none());
        assert!(repo_slug("https://github.com/only-owner").is_none());
    }

    #[test]
    fn tag_name_parsed_from_release_json() {
        let json = r#"{"tag_name": "v0.10.4", "name": "NVIM v0.10.4", "prerelease": false}"#;
        assert_eq!(parse_tag_name(json).as_deref(), Some("v0.10.4"));
    }

    #[test]
    fn tag_name_absent_or_malformed() {
        assert!(parse_tag_name(r#"{"name": "x"}"#).is_none());
        assert!(parse_tag_name("not json").is_none());
        assert!(parse_tag_name(r#"{"tag_name": 42}"#).is_none());
    }

    #[test]
    fn asset_url_layout() {
        assert_eq!(
            asset_url(
                "https://github.com/neovim/neovim",
                "v0.10.4",
                "nvim-linux-x86_64.appimage"
            ),
            "https://github.com/neovim/neovim/releases/download/v0.10.4/nvim-linux-x86_64.appimage"
        );
    }

    #[test]
    fn nightly_and_tag_selectors_skip_the_network() {
        let log = Logger::new(false, "test-github");
        assert_eq!(
            resolve_ref("https://github.com/a/b", &VersionSelector::Nightly, &log),
            "nightly"
        );
        assert_eq!(
            resolve_ref(
                "https://github.com/a/b",
                &VersionSelector::Tag("v1.2.3".to_string()),
                &log
            ),
            "v1.2.3"
        );
    }
}
