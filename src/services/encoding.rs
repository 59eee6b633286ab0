use std::sync::OnceLock;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use regex::bytes::Regex;
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

fn po_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Content-Type:[^\n]*charset=([A-Za-z0-9_.:\-]+)").unwrap())
}

/// Guesses the text encoding of a downloaded catalog.
///
/// A BOM wins, then a charset declared in the PO header (when it names an
/// encoding that actually decodes the data), then statistical detection.
pub fn detect_from_bytes(bytes: &[u8]) -> EncodingDetectionResult {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(None, true);
    let guessed_name = guessed.name().to_lowercase();
    let guessed_confidence = estimate_confidence(bytes, guessed);

    let mut candidates = Vec::new();

    if let Some(declared) = declared_charset(bytes) {
        let (_, _, had_errors) = declared.decode(bytes);
        if !had_errors {
            candidates.push(EncodingCandidate {
                name: declared.name().to_lowercase(),
                confidence: 0.95,
            });
        }
    }

    if candidates.iter().all(|c| c.name != guessed_name) {
        candidates.push(EncodingCandidate {
            name: guessed_name,
            confidence: guessed_confidence,
        });
    }

    let best = candidates[0].clone();
    EncodingDetectionResult {
        best: best.name,
        confidence: best.confidence,
        candidates,
    }
}

fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let caps = po_charset().captures(bytes)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
