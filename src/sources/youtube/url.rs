use reqwest::Url;

/// Hosts where the id travels in the `v` query parameter.
const QUERY_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

/// Path prefixes on youtube.com that carry the id as the next segment.
const PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

const VIDEO_ID_LEN: usize = 11;

pub fn is_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Pulls the video id out of a watch, short-link, embed, shorts or live URL.
///
/// Returns `None` for anything that is not a YouTube URL with a well-formed id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let candidate = if host == "youtu.be" {
        url.path_segments()?.next()?.to_string()
    } else if QUERY_HOSTS.contains(&host.as_str()) {
        let from_path = url.path_segments().and_then(|mut segments| {
            let prefix = segments.next()?;
            if PATH_PREFIXES.contains(&prefix) {
                segments.next().map(str::to_string)
            } else {
                None
            }
        });

        match from_path {
            Some(id) => id,
            None => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?,
        }
    } else {
        return None;
    };

    // trailing junk after the id is tolerated, e.g. youtu.be/<id>&feature=share
    let id: String = candidate.chars().take(VIDEO_ID_LEN).collect();
    is_video_id(&id).then_some(id)
}
