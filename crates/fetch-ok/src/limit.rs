//! Size limits for diagnostic response bodies
//!
//! Bodies are measured in characters (Unicode scalar values) so a limit
//! never splits a multi-byte sequence.

/// Maximum number of characters a diagnostic body may keep
pub const MAX_BODY_CHARS: usize = 2048;

/// Characters kept from the start of the body by [`BodyLimit::HeadTail`]
pub const HEAD_CHARS: usize = 1919;

/// Characters kept from the end of the body by [`BodyLimit::HeadTail`]
pub const TAIL_CHARS: usize = 128;

/// Marker placed between head and tail by [`BodyLimit::HeadTail`]
pub const ELLIPSIS: char = '…';

/// Bytes read from a failed response under [`BodyLimit::Head`]
///
/// A UTF-8 character takes at most four bytes.
pub const MAX_BODY_BYTES: usize = MAX_BODY_CHARS * 4;

/// Truncation policy for the body attached to a [`ResponseError`](crate::ResponseError)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyLimit {
    /// Keep the first [`MAX_BODY_CHARS`] characters
    #[default]
    Head,
    /// Keep the first [`HEAD_CHARS`] characters, an [`ELLIPSIS`] and the last
    /// [`TAIL_CHARS`] characters
    HeadTail,
}

impl BodyLimit {
    /// Apply the policy to an optional body
    pub fn apply(self, body: Option<String>) -> Option<String> {
        body.map(|text| match self {
            BodyLimit::Head => truncate_head(text),
            BodyLimit::HeadTail => truncate_head_tail(text),
        })
    }

    /// Bytes worth reading from a failed response, or `None` for the whole body
    ///
    /// [`BodyLimit::HeadTail`] keeps the end of the body and therefore has to
    /// read all of it.
    pub fn read_cap(self) -> Option<usize> {
        match self {
            BodyLimit::Head => Some(MAX_BODY_BYTES),
            BodyLimit::HeadTail => None,
        }
    }
}

/// Decode a body prefix cut at an arbitrary byte
///
/// A multi-byte sequence left incomplete by the cut is dropped; other invalid
/// bytes are replaced.
pub(crate) fn decode_prefix(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let utf8 = err.utf8_error();
            let mut bytes = err.into_bytes();
            if utf8.error_len().is_none() {
                bytes.truncate(utf8.valid_up_to());
            }
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

/// Cut `text` to at most `max_bytes` bytes on a character boundary
pub(crate) fn cap_bytes(mut text: String, max_bytes: usize) -> String {
    if text.len() > max_bytes {
        let mut end = max_bytes;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

fn truncate_head(mut text: String) -> String {
    if let Some((end, _)) = text.char_indices().nth(MAX_BODY_CHARS) {
        text.truncate(end);
    }
    text
}

fn truncate_head_tail(text: String) -> String {
    let count = text.chars().count();
    if count <= MAX_BODY_CHARS {
        return text;
    }

    let head_end = text
        .char_indices()
        .nth(HEAD_CHARS)
        .map_or(text.len(), |(index, _)| index);
    let tail_start = text
        .char_indices()
        .nth(count - TAIL_CHARS)
        .map_or(text.len(), |(index, _)| index);

    let mut out = String::with_capacity(head_end + ELLIPSIS.len_utf8() + text.len() - tail_start);
    out.push_str(&text[..head_end]);
    out.push(ELLIPSIS);
    out.push_str(&text[tail_start..]);
    out
}
