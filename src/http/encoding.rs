//! Content-coding negotiation and gzip compression.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

pub const GZIP: &str = "gzip";

/// Checks an `Accept-Encoding` value such as `"deflate, gzip"` for the gzip token.
///
/// A `q=0` weight on the gzip entry (`gzip;q=0`) means gzip is refused.
pub fn lists_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|entry| {
        let mut parts = entry.split(';');
        let coding = parts.next().unwrap_or("").trim();

        coding.eq_ignore_ascii_case(GZIP) && !parts.any(is_zero_weight)
    })
}

fn is_zero_weight(param: &str) -> bool {
    match param.split_once('=') {
        Some((name, value)) if name.trim().eq_ignore_ascii_case("q") => value
            .trim()
            .parse::<f32>()
            .map(|q| q <= 0.0)
            .unwrap_or(false),
        _ => false,
    }
}

pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
