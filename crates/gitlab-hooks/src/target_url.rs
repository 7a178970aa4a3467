//! Callback URL GitLab hooks are pointed at.

use url::Url;

/// Path segments of the webhook receiver under the automation server root.
const HOOK_PATH_SEGMENTS: [&str; 2] = ["gitlab-webhook", "post"];

/// Prefix of root URLs that GitLab could never deliver to.
const LOCALHOST_PREFIX: &str = "http://localhost:";

/// Build the hook target URL from the automation server's root URL.
///
/// Returns `None` when the root URL is blank, local, or not a valid absolute
/// URL; no hook should be managed in that case.
#[must_use]
pub fn build_target_url(root_url: &str) -> Option<String> {
    let root_url = root_url.trim();
    if root_url.is_empty() || root_url.starts_with(LOCALHOST_PREFIX) {
        return None;
    }

    // Parsed only to validate; the configured form is kept verbatim.
    let parsed = Url::parse(root_url).ok()?;
    if parsed.cannot_be_a_base() {
        return None;
    }

    let mut target = root_url.strip_suffix('/').unwrap_or(root_url).to_string();
    for segment in HOOK_PATH_SEGMENTS {
        target.push('/');
        target.push_str(&urlencoding::encode(segment));
    }

    Some(target)
}
