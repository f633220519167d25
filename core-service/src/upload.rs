//! Upload payload validation and naming
//!
//! Caller-visible preconditions for the upload path: the MIME allow-list,
//! the size cap, base64/data-URL decoding, and collision-resistant file
//! naming. Violations are rejected before any storage call is attempted.

use crate::error::{Result, ServiceError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rand::Rng;

/// Image MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Alphabet for the random file-name component.
const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random file-name component.
const NAME_RANDOM_LEN: usize = 6;

/// Whether a declared MIME type is an accepted image type.
pub fn is_valid_image(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Generate a collision-resistant storage name:
/// `image_<epoch-millis>_<6-char-random>.<original-extension>`.
///
/// The caller-supplied base name is discarded except for its extension,
/// which prevents path and name injection without needing a lookup. The
/// timestamp plus random suffix makes reuse of an exact name across calls
/// vanishingly unlikely even within the same millisecond.
pub fn generate_file_name(original_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();

    let mut rng = rand::thread_rng();
    let random: String = (0..NAME_RANDOM_LEN)
        .map(|_| NAME_CHARSET[rng.gen_range(0..NAME_CHARSET.len())] as char)
        .collect();

    let extension = original_name.rsplit('.').next().unwrap_or("bin");

    format!("image_{}_{}.{}", timestamp, random, extension)
}

/// Decoded upload payload.
pub struct DecodedPayload {
    pub bytes: Vec<u8>,
    /// MIME type extracted from a data-URL prefix, when one was present
    pub mime_type: Option<String>,
}

/// Decode a base64 payload, stripping a `data:<mime>;base64,` prefix when
/// the client sent a data URL. A MIME type embedded in the prefix is
/// returned so it can stand in for a missing declared type.
pub fn decode_base64_payload(data: &str) -> Result<DecodedPayload> {
    let (mime_type, encoded) = match data.strip_prefix("data:") {
        Some(rest) => {
            let comma = rest.find(',').ok_or_else(|| {
                ServiceError::Validation("data URL is missing its payload".to_string())
            })?;
            let header = &rest[..comma];
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (mime, &rest[comma + 1..])
        }
        None => (None, data),
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| ServiceError::Validation(format!("payload is not valid base64: {}", e)))?;

    Ok(DecodedPayload { bytes, mime_type })
}

/// Reject payloads over the configured cap. A payload of exactly the cap is
/// accepted; one byte more is not.
pub fn check_size(len: usize, max_bytes: usize) -> Result<()> {
    if len > max_bytes {
        return Err(ServiceError::Validation(format!(
            "payload of {} bytes exceeds the {} byte limit",
            len, max_bytes
        )));
    }
    Ok(())
}

/// Format a session duration the way the status endpoint reports it,
/// e.g. `2h 15m`, `4m 30s`, `12s`.
pub fn format_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
