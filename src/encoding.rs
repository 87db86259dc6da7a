//! Input encoding resolution.
//!
//! Resolution is a strategy so the loader never branches on how the encoding
//! was chosen: the default sniffs a byte-order mark and then trial-decodes an
//! ordered candidate list, while `--encoding` pins a single label.
//!
//! Labels follow the WHATWG set implemented by `encoding_rs`, so `latin1` and
//! `iso-8859-1` both resolve to windows-1252.
use anyhow::{anyhow, Result};
use encoding_rs::Encoding;

/// Candidate labels tried in order when no encoding is forced.
pub const DEFAULT_CANDIDATES: [&str; 2] = ["utf-8", "windows-1252"];

/// Text decoded from the input file along with the encoding that produced it.
#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// No candidate decoded the input without malformed sequences.
#[derive(Debug)]
pub struct Undecodable {
    pub tried: Vec<String>,
}

/// Strategy for turning raw input bytes into text.
pub trait EncodingResolver {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, Undecodable>;
}

/// BOM sniff followed by strict trial decoding of each candidate in order.
#[derive(Debug, Clone)]
pub struct TrialDecode {
    candidates: Vec<&'static Encoding>,
}

impl TrialDecode {
    pub fn new(candidates: Vec<&'static Encoding>) -> Self {
        let mut unique: Vec<&'static Encoding> = Vec::new();
        for encoding in candidates {
            if !unique.contains(&encoding) {
                unique.push(encoding);
            }
        }
        Self { candidates: unique }
    }

    pub fn from_labels(labels: &[&str]) -> Result<Self> {
        let candidates = labels
            .iter()
            .map(|label| lookup_label(label))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(candidates))
    }
}

impl Default for TrialDecode {
    fn default() -> Self {
        Self::new(vec![encoding_rs::UTF_8, encoding_rs::WINDOWS_1252])
    }
}

impl EncodingResolver for TrialDecode {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, Undecodable> {
        let mut tried = Vec::new();
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            if let Some(text) = strict_decode(encoding, &bytes[bom_len..]) {
                return Ok(Decoded { text, encoding });
            }
            tried.push(format!("{} (byte-order mark)", encoding.name()));
        }
        for &encoding in &self.candidates {
            if let Some(text) = strict_decode(encoding, bytes) {
                return Ok(Decoded { text, encoding });
            }
            tracing::debug!(encoding = encoding.name(), "trial decode rejected");
            tried.push(encoding.name().to_string());
        }
        Err(Undecodable { tried })
    }
}

/// A single user-pinned encoding, decoded strictly.
#[derive(Debug, Clone, Copy)]
pub struct FixedEncoding {
    encoding: &'static Encoding,
}

impl FixedEncoding {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        Ok(Self::new(lookup_label(label)?))
    }
}

impl EncodingResolver for FixedEncoding {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, Undecodable> {
        let body = match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) if encoding == self.encoding => &bytes[bom_len..],
            _ => bytes,
        };
        strict_decode(self.encoding, body)
            .map(|text| Decoded {
                text,
                encoding: self.encoding,
            })
            .ok_or_else(|| Undecodable {
                tried: vec![self.encoding.name().to_string()],
            })
    }
}

/// Pick the resolver for an optional `--encoding` label.
pub fn resolver_for(label: Option<&str>) -> Result<Box<dyn EncodingResolver>> {
    match label.map(str::trim) {
        None | Some("") | Some("auto") => Ok(Box::new(TrialDecode::from_labels(
            &DEFAULT_CANDIDATES,
        )?)),
        Some(label) => Ok(Box::new(FixedEncoding::from_label(label)?)),
    }
}

pub fn lookup_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow!("unknown encoding label {label:?}"))
}

fn strict_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}
