//! Parsing and validation of S3 object addresses.
//!
//! Parsing completes, and any malformed line rejects the whole load,
//! before a single backend call is made — a doomed run never touches the
//! network.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;

/// A parsed, validated pointer to one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAddress {
    /// 1-based line number in the input file (blank lines counted).
    pub line: usize,
    /// Canonical reconstruction `s3://bucket/key`.
    pub uri: String,
    pub bucket: String,
    pub key: String,
}

impl ObjectAddress {
    /// Parse one input line as `s3://bucket/key`.
    ///
    /// The scheme is matched case-insensitively; the canonical `uri` is
    /// always rebuilt with a lowercase scheme and a single separator, so
    /// `s3://b//k` and `S3://b/k` both canonicalize to `s3://b/k`.
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let malformed = || ErrorKind::MalformedAddress { line, text: text.to_owned() };
        let (scheme, rest) = text.split_once("://").ok_or_raise(malformed)?;
        if !scheme.eq_ignore_ascii_case("s3") {
            exn::bail!(malformed());
        }
        let (bucket, path) = rest.split_once('/').ok_or_raise(malformed)?;
        let key = path.trim_start_matches('/');
        if bucket.is_empty() || key.is_empty() {
            exn::bail!(malformed());
        }
        Ok(Self {
            line,
            uri: format!("s3://{bucket}/{key}"),
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        })
    }

    /// Final non-empty segment of the key, used as the manifest file name.
    pub fn file_name(&self) -> Result<&str> {
        self.key.split('/').rev().find(|segment| !segment.is_empty()).ok_or_raise(|| ErrorKind::UnderivableFileName {
            line: self.line,
            key: self.key.clone(),
        })
    }
}

/// Parse the whole input text, one candidate address per line.
///
/// Blank lines are stripped and discarded. With `skip_header`, the first
/// non-blank line is discarded unparsed. Fails with
/// [`NoAddresses`](ErrorKind::NoAddresses) when nothing usable remains.
pub fn parse_addresses(input: &str, skip_header: bool) -> Result<Vec<ObjectAddress>> {
    let mut addresses = Vec::new();
    let mut skipped_header = false;
    for (index, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if skip_header && !skipped_header {
            skipped_header = true;
            continue;
        }
        addresses.push(ObjectAddress::parse(line, index + 1)?);
    }
    if addresses.is_empty() {
        exn::bail!(ErrorKind::NoAddresses);
    }
    Ok(addresses)
}
