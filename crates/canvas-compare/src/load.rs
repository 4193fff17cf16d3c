use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use canvas_compare::PixelBuffer;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no image source provided")]
    Empty,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("malformed data URI: {0}")]
    DataUri(&'static str),

    #[error("invalid base64 in data URI: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
    DataUri(String),
}

impl ImageSource {
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LoadError::Empty);
        }
        if raw.starts_with("data:") {
            Ok(Self::DataUri(raw.to_owned()))
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(Self::Url(raw.to_owned()))
        } else {
            Ok(Self::Path(PathBuf::from(raw)))
        }
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
            // Data URIs can be megabytes long.
            Self::DataUri(_) => f.write_str("data URI"),
        }
    }
}

/// Fetch the encoded bytes of an image.
pub async fn fetch(source: &ImageSource) -> Result<Vec<u8>, LoadError> {
    match source {
        ImageSource::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| LoadError::Read {
                    path: path.clone(),
                    source,
                })
        }
        ImageSource::Url(url) => {
            debug!(url = %url, "GET");
            let fetch_err = |source: reqwest::Error| LoadError::Fetch {
                url: url.clone(),
                source,
            };
            let resp = reqwest::get(url)
                .await
                .and_then(|r| r.error_for_status())
                .map_err(fetch_err)?;
            let bytes = resp.bytes().await.map_err(fetch_err)?;
            Ok(bytes.to_vec())
        }
        ImageSource::DataUri(uri) => decode_data_uri(uri),
    }
}

/// Decode the payload of a `data:[<mediatype>];base64,<data>` URI.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, LoadError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or(LoadError::DataUri("missing `data:` prefix"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or(LoadError::DataUri("missing `,` separator"))?;
    if !meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(LoadError::DataUri("only base64 payloads are supported"));
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Decode encoded image bytes into RGBA samples. CPU-bound.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, LoadError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    Ok(PixelBuffer::from(img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, color);
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    // -- source parsing --

    #[test]
    fn sources_are_classified() {
        assert_eq!(
            ImageSource::parse("frames/a.png").unwrap(),
            ImageSource::Path(PathBuf::from("frames/a.png"))
        );
        assert!(matches!(
            ImageSource::parse("https://example.com/a.png").unwrap(),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA").unwrap(),
            ImageSource::DataUri(_)
        ));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(ImageSource::parse("  "), Err(LoadError::Empty)));
    }

    // -- data URIs --

    #[test]
    fn data_uri_round_trips_to_pixels() {
        let bytes = png(2, 3, Rgba([1, 2, 3, 255]));
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        let decoded = decode(&decode_data_uri(&uri).unwrap()).unwrap();
        assert_eq!(decoded, PixelBuffer::filled(2, 3, [1, 2, 3, 255]));
    }

    #[test]
    fn non_base64_data_uri_is_rejected() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(LoadError::DataUri(_))
        ));
    }

    #[test]
    fn bad_base64_is_rejected() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,!!!"),
            Err(LoadError::Base64(_))
        ));
    }

    // -- files --

    #[tokio::test]
    async fn file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, png(4, 4, Rgba([9, 9, 9, 255]))).unwrap();
        let bytes = fetch(&ImageSource::Path(path)).await.unwrap();
        assert_eq!(decode(&bytes).unwrap().dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(&ImageSource::Path(dir.path().join("nope.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(decode(b"not an image"), Err(LoadError::Decode(_))));
    }
}
