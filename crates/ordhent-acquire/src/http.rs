use anyhow::{Context, Result};

pub const USER_AGENT: &str = concat!("ordhent/", env!("CARGO_PKG_VERSION"), " (vocabulary tool)");

/// Shared client settings for every outbound request in the workspace.
pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}
