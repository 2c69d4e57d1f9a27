use std::cmp::Reverse;

use crate::{common::GatewayError, common::types::MediaKind, sources::FormatDescriptor};

/// Picks the variant to relay for `kind`.
///
/// Formats without a locator are never considered. Audio prefers audio-only
/// streams, ranked by bitrate, then anything carrying audio. Video prefers a
/// muxed stream so nothing has to be merged later, then any video stream,
/// in the order the backend listed them.
pub fn select_format(
    formats: &[FormatDescriptor],
    kind: MediaKind,
) -> Result<&FormatDescriptor, GatewayError> {
    let candidates: Vec<&FormatDescriptor> = formats.iter().filter(|f| f.is_relayable()).collect();

    let chosen = match kind {
        MediaKind::Audio => {
            highest_bitrate(candidates.iter().copied().filter(|f| f.has_audio && !f.has_video))
                .or_else(|| highest_bitrate(candidates.iter().copied().filter(|f| f.has_audio)))
        }
        MediaKind::Video => candidates
            .iter()
            .copied()
            .find(|f| f.has_video && f.has_audio)
            .or_else(|| candidates.iter().copied().find(|f| f.has_video)),
    };

    chosen.ok_or(GatewayError::NoSuitableFormat(kind))
}

// min_by_key keeps the first of equal keys, same as a stable descending sort
fn highest_bitrate<'a>(
    formats: impl Iterator<Item = &'a FormatDescriptor>,
) -> Option<&'a FormatDescriptor> {
    formats.min_by_key(|f| Reverse(f.audio_bitrate.unwrap_or(0)))
}
