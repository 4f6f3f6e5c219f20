//! Filter and option arguments of the encode stage.

use crate::external::VideoFilterChain;
use crate::transcode::request::TranscodeRequest;

/// Scale (and pad) expression for the requested box, if any.
///
/// With both dimensions the picture is scaled to fit inside the box, keeping
/// its aspect ratio, and centered on black padding. With one dimension the
/// other follows the aspect ratio, rounded to an even value.
pub fn scale_pad_filter(width: Option<u32>, height: Option<u32>) -> Option<String> {
    match (width, height) {
        (Some(w), Some(h)) => Some(format!(
            "scale='min({w},iw*{h}/ih)':'min({h},ih*{w}/iw)',pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black"
        )),
        (Some(w), None) => Some(format!("scale={w}:-2")),
        (None, Some(h)) => Some(format!("scale=-2:{h}")),
        (None, None) => None,
    }
}

/// Output options for the encode stage, in order: frame rate, filter graph,
/// audio removal.
pub fn encode_args(request: &TranscodeRequest) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(rate) = request.frame_rate() {
        args.push("-r".to_string());
        args.push(format!("{rate}"));
    }

    let filters = VideoFilterChain::new()
        .add_optional(scale_pad_filter(request.width(), request.height()))
        .build();
    if let Some(filters) = filters {
        args.push("-vf".to_string());
        args.push(filters);
    }

    if request.remove_audio() {
        args.push("-an".to_string());
    }

    args
}
