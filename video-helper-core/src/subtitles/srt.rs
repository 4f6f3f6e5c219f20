// ============================================================================
// video-helper-core/src/subtitles/srt.rs
// ============================================================================
//
// SRT TO WEBVTT
//
// SRT color markup `<font color="#RRGGBB">text</font>` becomes the WebVTT
// class span `<c.rrggbb>text</c>`, and every color found gets a `::cue` rule
// in a companion stylesheet. Timecode lines switch their decimal separator
// from ',' to '.'. Everything else is copied through unchanged.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::utils::sibling_path;

static FONT_COLOR_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<font color="(#\w{6})">"#).expect("font color pattern"));

static FONT_COLOR_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<font color="(#\w{6})">(.*?)</font>"#).expect("font color span pattern")
});

/// Paths written by [`srt_to_vtt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOutputs {
    pub vtt: PathBuf,
    pub css: PathBuf,
    /// Colors found in the input, uppercase `#RRGGBB`
    pub colors: BTreeSet<String>,
}

/// All distinct `#RRGGBB` colors used by font tags in `srt_path`, uppercased.
pub fn extract_unique_colors(srt_path: &Path) -> CoreResult<BTreeSet<String>> {
    let text = read_srt(srt_path)?;
    Ok(colors_in(&text))
}

fn colors_in(text: &str) -> BTreeSet<String> {
    FONT_COLOR_OPEN
        .captures_iter(text)
        .map(|caps| caps[1].to_uppercase())
        .collect()
}

fn class_name(color: &str) -> String {
    color.trim_start_matches('#').to_lowercase()
}

/// One `::cue(.rrggbb) { color: #RRGGBB; }` line per color.
pub fn generate_cue_stylesheet(colors: &BTreeSet<String>) -> String {
    colors
        .iter()
        .map(|color| format!("::cue(.{}) {{ color: {color}; }}\n", class_name(color)))
        .collect()
}

/// Rewrites SRT font color spans in `line` as WebVTT class spans.
pub fn convert_color_tags(line: &str) -> String {
    FONT_COLOR_SPAN
        .replace_all(line, |caps: &regex::Captures| {
            format!("<c.{}>{}</c>", class_name(&caps[1]), &caps[2])
        })
        .into_owned()
}

/// Converts `srt_path` to WebVTT and writes the cue stylesheet.
///
/// The outputs default to `<folder>/<stem>.vtt` and `<folder>/<stem>.css`.
pub fn srt_to_vtt(srt_path: &Path, vtt_path: Option<&Path>, css_path: Option<&Path>) -> CoreResult<SubtitleOutputs> {
    let text = read_srt(srt_path)?;
    let colors = colors_in(&text);

    let vtt = vtt_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_path(srt_path, "", Some("vtt")));
    let css = css_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_path(srt_path, "", Some("css")));

    fs::write(&css, generate_cue_stylesheet(&colors))?;
    log::info!("CSS file generated: {}", css.display());

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str("WEBVTT\n\n");
    for line in text.split_inclusive('\n') {
        let line = convert_color_tags(line);
        if line.contains("-->") {
            out.push_str(&line.replace(',', "."));
        } else {
            out.push_str(&line);
        }
    }
    fs::write(&vtt, out)?;
    log::info!("WebVTT saved as: {}", vtt.display());

    Ok(SubtitleOutputs { vtt, css, colors })
}

fn read_srt(path: &Path) -> CoreResult<String> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}
