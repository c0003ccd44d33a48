// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Key classification and payload decoding
//!
//! The shape of a lookup key decides what its payload decodes into: IP
//! addresses yield [`IpDetails`], ASN identifiers yield [`AsnDetails`], and
//! anything else (field paths like `8.8.8.8/country`, custom endpoints) is
//! kept as raw JSON.

use std::collections::HashMap;
use std::net::IpAddr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::DecodeError;
use crate::models::{
    AsnDetails, CoreDetails, IpDetails, LiteDetails, PlusDetails, ResproxyDetails,
};

/// What a lookup key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// An IPv4 or IPv6 address
    Ip,
    /// `AS` (any case) followed by one or more digits
    Asn,
    /// Anything else
    Other,
}

impl KeyShape {
    /// Classifies a lookup key
    ///
    /// ```
    /// use ipinfo_client::KeyShape;
    ///
    /// assert_eq!(KeyShape::classify("8.8.8.8"), KeyShape::Ip);
    /// assert_eq!(KeyShape::classify("as15169"), KeyShape::Asn);
    /// assert_eq!(KeyShape::classify("8.8.8.8/country"), KeyShape::Other);
    /// ```
    pub fn classify(key: &str) -> Self {
        if key.parse::<IpAddr>().is_ok() {
            KeyShape::Ip
        } else if is_asn(key) {
            KeyShape::Asn
        } else {
            KeyShape::Other
        }
    }
}

/// Whether `s` is an ASN identifier
pub fn is_asn(s: &str) -> bool {
    match (s.get(..2), s.get(2..)) {
        (Some(prefix), Some(digits)) => {
            prefix.eq_ignore_ascii_case("AS")
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

/// Canonical form of an ASN identifier (`as15169` -> `AS15169`)
pub fn normalize_asn(s: &str) -> Option<String> {
    is_asn(s).then(|| s.to_ascii_uppercase())
}

/// Any value the client caches or returns from a batch
///
/// This is the single type stored in a client's cache backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LookupValue {
    Details(IpDetails),
    Asn(AsnDetails),
    Resproxy(ResproxyDetails),
    Lite(LiteDetails),
    Core(CoreDetails),
    Plus(PlusDetails),
    Text(String),
    Generic(serde_json::Value),
}

impl LookupValue {
    /// Name of the variant, for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            LookupValue::Details(_) => "IpDetails",
            LookupValue::Asn(_) => "AsnDetails",
            LookupValue::Resproxy(_) => "ResproxyDetails",
            LookupValue::Lite(_) => "LiteDetails",
            LookupValue::Core(_) => "CoreDetails",
            LookupValue::Plus(_) => "PlusDetails",
            LookupValue::Text(_) => "text",
            LookupValue::Generic(_) => "generic JSON",
        }
    }

    pub(crate) fn into_details(self, key: &str) -> Result<IpDetails, DecodeError> {
        match self {
            LookupValue::Details(details) => Ok(details),
            other => Err(unexpected(key, "IpDetails", &other)),
        }
    }

    pub(crate) fn into_asn(self, key: &str) -> Result<AsnDetails, DecodeError> {
        match self {
            LookupValue::Asn(details) => Ok(details),
            other => Err(unexpected(key, "AsnDetails", &other)),
        }
    }

    pub(crate) fn into_resproxy(self, key: &str) -> Result<ResproxyDetails, DecodeError> {
        match self {
            LookupValue::Resproxy(details) => Ok(details),
            other => Err(unexpected(key, "ResproxyDetails", &other)),
        }
    }

    pub(crate) fn into_lite(self, key: &str) -> Result<LiteDetails, DecodeError> {
        match self {
            LookupValue::Lite(details) => Ok(details),
            other => Err(unexpected(key, "LiteDetails", &other)),
        }
    }

    pub(crate) fn into_core(self, key: &str) -> Result<CoreDetails, DecodeError> {
        match self {
            LookupValue::Core(details) => Ok(details),
            other => Err(unexpected(key, "CoreDetails", &other)),
        }
    }

    pub(crate) fn into_plus(self, key: &str) -> Result<PlusDetails, DecodeError> {
        match self {
            LookupValue::Plus(details) => Ok(details),
            other => Err(unexpected(key, "PlusDetails", &other)),
        }
    }

    pub(crate) fn into_text(self, key: &str) -> Result<String, DecodeError> {
        match self {
            LookupValue::Text(text) => Ok(text),
            other => Err(unexpected(key, "text", &other)),
        }
    }
}

fn unexpected(key: &str, expected: &'static str, found: &LookupValue) -> DecodeError {
    DecodeError::UnexpectedShape {
        key: key.to_string(),
        expected,
        found: found.shape(),
    }
}

/// Decodes a JSON payload into `T`
pub(crate) fn decode_json<T: DeserializeOwned>(
    key: &str,
    expected: &'static str,
    body: &[u8],
) -> Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::json(key, expected, e))
}

/// Decodes a plain-text payload, trimming the trailing newline
pub(crate) fn decode_text(key: &str, body: &[u8]) -> Result<String, DecodeError> {
    std::str::from_utf8(body)
        .map(|text| text.trim().to_string())
        .map_err(|_| DecodeError::Text {
            key: key.to_string(),
        })
}

/// Decodes one record of a batch response according to its key's shape
pub fn decode_record(key: &str, raw: serde_json::Value) -> Result<LookupValue, DecodeError> {
    match KeyShape::classify(key) {
        KeyShape::Ip => {
            let mut details: IpDetails =
                serde_json::from_value(raw).map_err(|e| DecodeError::json(key, "IpDetails", e))?;
            details.enrich();
            Ok(LookupValue::Details(details))
        }
        KeyShape::Asn => {
            let mut details: AsnDetails =
                serde_json::from_value(raw).map_err(|e| DecodeError::json(key, "AsnDetails", e))?;
            details.enrich();
            Ok(LookupValue::Asn(details))
        }
        KeyShape::Other => Ok(LookupValue::Generic(raw)),
    }
}

/// Decodes a whole batch response body
///
/// All-or-nothing: the first record that fails to decode fails the whole
/// body, so a chunk never contributes a partial result.
pub fn decode_batch(body: &[u8]) -> Result<HashMap<String, LookupValue>, DecodeError> {
    let raw: HashMap<String, serde_json::Value> = decode_json("batch", "batch response", body)?;

    raw.into_iter()
        .map(|(key, value)| {
            let decoded = decode_record(&key, value)?;
            Ok((key, decoded))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(KeyShape::classify("1.1.1.1"), KeyShape::Ip);
        assert_eq!(KeyShape::classify("2001:4860:4860::8888"), KeyShape::Ip);
        assert_eq!(KeyShape::classify("AS321"), KeyShape::Asn);
        assert_eq!(KeyShape::classify("aS999"), KeyShape::Asn);
        assert_eq!(KeyShape::classify("AS"), KeyShape::Other);
        assert_eq!(KeyShape::classify("ASX1"), KeyShape::Other);
        assert_eq!(KeyShape::classify("AS15169/name"), KeyShape::Other);
        assert_eq!(KeyShape::classify("8.8.8.8/country"), KeyShape::Other);
        assert_eq!(KeyShape::classify("ä"), KeyShape::Other);
    }

    #[test]
    fn test_normalize_asn() {
        assert_eq!(normalize_asn("as15169").as_deref(), Some("AS15169"));
        assert_eq!(normalize_asn("15169"), None);
    }

    #[test]
    fn test_decode_batch_by_shape() {
        let body = serde_json::to_vec(&json!({
            "8.8.8.8": {"ip": "8.8.8.8", "country": "US"},
            "AS321": {"asn": "AS321", "name": "DNIC-AS-00321", "country": "US"},
            "8.8.8.8/country": "US"
        }))
        .unwrap();

        let decoded = decode_batch(&body).unwrap();
        assert_eq!(decoded.len(), 3);

        match &decoded["8.8.8.8"] {
            LookupValue::Details(details) => assert_eq!(details.country_name, "United States"),
            other => panic!("unexpected {other:?}"),
        }
        match &decoded["AS321"] {
            LookupValue::Asn(details) => assert_eq!(details.name, "DNIC-AS-00321"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(decoded["8.8.8.8/country"], LookupValue::Generic(json!("US")));
    }

    #[test]
    fn test_decode_batch_fails_as_a_whole() {
        let body = serde_json::to_vec(&json!({
            "1.1.1.1": {"ip": "1.1.1.1"},
            "AS999": "not an object"
        }))
        .unwrap();

        let error = decode_batch(&body).unwrap_err();
        assert!(matches!(error, DecodeError::Json { expected: "AsnDetails", .. }));
    }

    #[test]
    fn test_decode_text_trims() {
        assert_eq!(decode_text("8.8.8.8:city", b"Mountain View\n").unwrap(), "Mountain View");
        assert!(decode_text("8.8.8.8:city", &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let error = LookupValue::Text("US".to_string())
            .into_details("8.8.8.8")
            .unwrap_err();
        assert!(matches!(
            error,
            DecodeError::UnexpectedShape {
                expected: "IpDetails",
                found: "text",
                ..
            }
        ));
    }
}
