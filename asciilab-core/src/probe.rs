//! Typeface definition probes (made by FontLab https://www.fontlab.com/)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

/// Where FIGlet definitions are fetched from unless configured otherwise.
pub const DEFAULT_FONT_BASE_URL: &str =
    "https://raw.githubusercontent.com/patorjk/figlet.js/master/fonts/";

/// Extension of FIGlet typeface definition files.
pub const FONT_EXTENSION: &str = "flf";

/// Trait for checking whether a typeface definition can be retrieved.
///
/// `Ok(())` means available; any error means unavailable for the session.
#[allow(async_fn_in_trait)]
pub trait TypefaceProbe {
    async fn probe(&self, name: &str) -> Result<()>;
}

/// Fetches `<base>/<name>.flf` over HTTP; any 2xx counts as available.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    base: Url,
    cache_dir: Option<PathBuf>,
}

impl HttpProbe {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid font base URL: {base}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("font base URL cannot carry a path: {base}"));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("asciilab/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base,
            cache_dir: None,
        })
    }

    /// Keep fetched definitions on disk so a file-based engine can load them.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// URL of the definition for `name`, with the name percent-encoded as one path segment.
    pub fn definition_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&format!("{name}.{FONT_EXTENSION}"));
        }
        url
    }
}

impl TypefaceProbe for HttpProbe {
    async fn probe(&self, name: &str) -> Result<()> {
        let url = self.definition_url(name);
        tracing::debug!(typeface = %name, %url, "probing typeface definition");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{url} answered {status}"));
        }

        if let Some(dir) = &self.cache_dir {
            let Some(file_name) = cache_file_name(name) else {
                return Err(anyhow!("refusing to cache typeface with path-like name: {name}"));
            };
            let body = response
                .bytes()
                .await
                .with_context(|| format!("reading {url}"))?;
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating font cache {}", dir.display()))?;
            let path = dir.join(file_name);
            tokio::fs::write(&path, &body)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
        }

        Ok(())
    }
}

/// File name a cached definition is stored under, or `None` when the name
/// would escape the cache directory.
pub fn cache_file_name(name: &str) -> Option<String> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);
    (!invalid).then(|| format!("{name}.{FONT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_names_stay_inside_the_directory() {
        assert_eq!(cache_file_name("Star Wars").as_deref(), Some("Star Wars.flf"));
        assert_eq!(cache_file_name("../etc/passwd"), None);
        assert_eq!(cache_file_name("a/b"), None);
        assert_eq!(cache_file_name(""), None);
    }

    #[test]
    fn definition_url_escapes_name() {
        let probe = HttpProbe::new(DEFAULT_FONT_BASE_URL).expect("probe");
        assert_eq!(
            probe.definition_url("Star Wars").as_str(),
            "https://raw.githubusercontent.com/patorjk/figlet.js/master/fonts/Star%20Wars.flf"
        );
    }

    #[test]
    fn definition_url_works_without_trailing_slash() {
        let probe = HttpProbe::new("https://fonts.example/figlet").expect("probe");
        assert_eq!(
            probe.definition_url("Big").as_str(),
            "https://fonts.example/figlet/Big.flf"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(HttpProbe::new("not a url").is_err());
        assert!(HttpProbe::new("mailto:fonts@example.com").is_err());
    }
}
