//! Re-hosts artist artwork on Cloudinary with the dashboard's tile styling.
//!
//! Uploads are signed with the account's API secret (SHA-256). Each artist
//! gets a stable public id, so a later run replaces the earlier image.

use std::sync::LazyLock;

use chrono::Utc;
use homedash_core::CloudinaryCredentials;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::client::{ApiClient, Service};
use crate::error::IntegrationError;

pub const FOLDER: &str = "music";

/// Desaturated 240px tile with the overlay image underneath.
pub const ARTIST_TRANSFORMATION: &str = "e_saturation:-15,fl_force_strip,h_240,w_240,o_70,q_auto:good,c_fill/h_240,w_240,o_60,u_music-overlay,c_fill";

const UPLOAD: &str = "cloudinary upload";
const MAX_PUBLIC_ID_LEN: usize = 100;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-_]").expect("valid public id regex"));

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Stable Cloudinary public id for an artist's tile, e.g. `sigur-rs-artist`.
#[must_use]
pub fn artist_public_id(artist: &str) -> String {
    let dashed = format!("{artist}-artist").replace(' ', "-");
    let mut id = UNSAFE_CHARS.replace_all(&dashed, "").to_lowercase();
    id.truncate(MAX_PUBLIC_ID_LEN);
    id
}

/// Hex SHA-256 over the alphabetically sorted `key=value` pairs joined by
/// `&`, followed by the API secret.
#[must_use]
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

/// Upload the image at `image_url` as the tile for `artist` and return the
/// hosted `secure_url`.
///
/// # Errors
///
/// Returns a remote error if the upload fails or a shape error if the
/// response has no `secure_url`.
pub async fn upload_artist_image(
    client: &ApiClient,
    credentials: &CloudinaryCredentials,
    artist: &str,
    image_url: &str,
) -> Result<String, IntegrationError> {
    let public_id = artist_public_id(artist);
    let timestamp = Utc::now().timestamp().to_string();
    let signed = [
        ("folder", FOLDER),
        ("public_id", public_id.as_str()),
        ("timestamp", timestamp.as_str()),
        ("transformation", ARTIST_TRANSFORMATION),
    ];
    let signature = sign(&signed, &credentials.api_secret);

    let mut form: Vec<(&str, &str)> = signed.to_vec();
    form.extend([
        ("file", image_url),
        ("api_key", credentials.api_key.as_str()),
        ("signature", signature.as_str()),
        ("signature_algorithm", "sha256"),
    ]);

    let request = client
        .http()
        .post(client.url(
            Service::Cloudinary,
            &["v1_1", credentials.cloud_name.as_str(), "image", "upload"],
        ))
        .form(&form);

    let response: UploadResponse = client.send_json(request, UPLOAD).await?;
    response
        .secure_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| IntegrationError::shape(UPLOAD, "missing `secure_url`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_is_slugged() {
        assert_eq!(artist_public_id("Sigur Rós"), "sigur-rs-artist");
        assert_eq!(artist_public_id("AC/DC"), "acdc-artist");
        assert_eq!(artist_public_id("The_National"), "the_national-artist");
    }

    #[test]
    fn public_id_is_capped_at_100_chars() {
        let long = "a".repeat(150);
        assert_eq!(artist_public_id(&long).len(), 100);
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let unsorted = sign(&[("timestamp", "1"), ("folder", "music")], "s3cret");
        let sorted = sign(&[("folder", "music"), ("timestamp", "1")], "s3cret");
        assert_eq!(unsorted, sorted);

        let expected = format!("{:x}", Sha256::digest(b"folder=music&timestamp=1s3cret"));
        assert_eq!(sorted, expected);
        assert_eq!(sorted.len(), 64);
    }
}
