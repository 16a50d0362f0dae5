// crates/playout-core/src/transport.rs
//
// The canonical intermediate transport every per-clip decoder writes to its
// stdout, which the pump copies verbatim into the long-lived encoder's
// stdin: constant-bitrate intra-only mpeg2video, s302m audio, mpeg-ts
// container. Keeping every clip's decoder output on this one fixed
// transport is what lets clip boundaries splice cleanly inside a single
// continuous mpeg-ts stream.

use crate::config::PreCompress;

/// Builds the `-pix_fmt ... -f mpegts -` tail appended to every decoder
/// invocation, after its `-map` flags.
pub fn intermediate_transport_args(pre: &PreCompress) -> Vec<String> {
    vec![
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:v".into(),
        "mpeg2video".into(),
        "-intra".into(),
        "-b:v".into(),
        format!("{}k", pre.v_bitrate),
        "-minrate".into(),
        format!("{}k", pre.v_bitrate),
        "-maxrate".into(),
        format!("{}k", pre.v_bitrate),
        "-bufsize".into(),
        format!("{}k", pre.v_bufsize),
        "-c:a".into(),
        "s302m".into(),
        "-ar".into(),
        "48000".into(),
        "-ac".into(),
        "2".into(),
        "-f".into(),
        "mpegts".into(),
        "-".into(),
    ]
}
