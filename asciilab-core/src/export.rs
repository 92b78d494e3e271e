//! Exports: text files, share links and QR codes (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::codec;
use crate::params::{RenderParameters, DEFAULT_TEXT};

/// QR code rendering service for share links.
pub const QR_API: &str = "https://api.qrserver.com/v1/create-qr-code/";
/// Page that renders the art on its own from a query string.
pub const OUTPUT_PAGE: &str = "ascii.html";

pub fn download_file_name(typeface: &str) -> String {
    format!("ascii-art-{}.txt", typeface.to_lowercase())
}

/// Write `output` into `dir` under [`download_file_name`]; returns the path written.
pub fn write_text(output: &str, dir: &Path, typeface: &str) -> Result<PathBuf> {
    let name = download_file_name(typeface);
    if name.contains(['/', '\\']) {
        return Err(anyhow!("typeface name {typeface:?} cannot be used as a file name"));
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, output).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Link to the standalone output page, state in the query string.
pub fn share_url(page_base: &Url, params: &RenderParameters) -> Result<Url> {
    let mut url = page_base
        .join(OUTPUT_PAGE)
        .with_context(|| format!("joining {OUTPUT_PAGE} onto {page_base}"))?;

    let mut shared = params.clone();
    if shared.text.is_empty() {
        shared.text = DEFAULT_TEXT.to_string();
    }
    url.set_query(Some(&codec::encode(&shared)));
    Ok(url)
}

/// Link back to the app itself with the state in the fragment.
pub fn app_link(app: &Url, params: &RenderParameters) -> Url {
    let mut url = app.clone();
    url.set_fragment(Some(&codec::encode(params)));
    url
}

pub fn qr_code_url(data: &str) -> Result<Url> {
    Url::parse_with_params(
        QR_API,
        &[
            ("size", "1024x1024"),
            ("format", "png"),
            ("margin", "20"),
            ("data", data),
        ],
    )
    .context("building QR code URL")
}
