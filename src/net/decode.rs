// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Payload decoders used by `DataFuture`

#[cfg(feature = "image")]
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{DecodingError, Error};

/// A JSON document whose top level is a container
#[derive(Debug, Clone, PartialEq)]
pub enum JsonObject {
    List(Vec<Value>),
    Map(Map<String, Value>),
}

impl JsonObject {
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match *self {
            JsonObject::List(ref list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match *self {
            JsonObject::Map(ref map) => Some(map),
            _ => None,
        }
    }
}

pub fn json(data: &[u8]) -> Result<JsonObject, Error> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| DecodingError::Json(e.into()))?;

    match value {
        Value::Array(list) => Ok(JsonObject::List(list)),
        Value::Object(map) => Ok(JsonObject::Map(map)),
        _ => Err(DecodingError::NotAContainer.into()),
    }
}

/// Decode `data` as text in the encoding named `encoding` (UTF-8 if `None`).
///
/// Names are matched case-insensitively against `utf-8`, `us-ascii` and
/// `iso-8859-1` (plus their common aliases). Anything else fails with
/// `DecodingError::UnsupportedEncoding`.
pub fn text(data: &[u8], encoding: Option<&str>) -> Result<String, Error> {
    let label = encoding.unwrap_or("utf-8").trim().to_ascii_lowercase();
    let invalid = || Error::from(DecodingError::Text { encoding: label.clone() });

    match label.as_str() {
        "utf-8" | "utf8" => String::from_utf8(data.to_vec()).map_err(|_| invalid()),
        "us-ascii" | "ascii" => {
            if data.is_ascii() {
                String::from_utf8(data.to_vec()).map_err(|_| invalid())
            } else {
                Err(invalid())
            }
        }
        // Latin-1 maps every byte to the code point of the same value
        "iso-8859-1" | "latin1" | "latin-1" => Ok(data.iter().map(|&b| b as char).collect()),
        _ => Err(DecodingError::UnsupportedEncoding(label.clone()).into()),
    }
}

#[cfg(feature = "image")]
pub fn image(data: &[u8]) -> Result<Arc<::image::DynamicImage>, Error> {
    ::image::load_from_memory(data)
        .map(Arc::new)
        .map_err(|e| DecodingError::Image(e.to_string()).into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_containers() {
        let list = json(b"[1, 2, 3]").unwrap();
        assert_eq!(list.as_list().map(Vec::len), Some(3));

        let map = json(br#"{"name": "swift"}"#).unwrap();
        assert_eq!(map.as_map().and_then(|m| m.get("name")),
                   Some(&Value::String("swift".to_owned())));
    }

    #[test]
    fn test_json_fragment_is_rejected() {
        match json(b"42") {
            Err(Error::Decoding(DecodingError::NotAContainer)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match json(b"{not json") {
            Err(Error::Decoding(DecodingError::Json(..))) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_encodings() {
        assert_eq!(text("héllo".as_bytes(), None).unwrap(), "héllo");
        assert_eq!(text(b"plain", Some("US-ASCII")).unwrap(), "plain");
        assert_eq!(text(&[0x68, 0xe9], Some("ISO-8859-1")).unwrap(), "hé");

        assert!(text(&[0xff, 0xfe], Some("utf-8")).unwrap_err().is_decoding());
        assert!(text(&[0xe9], Some("ascii")).unwrap_err().is_decoding());
        match text(b"x", Some("shift_jis")) {
            Err(Error::Decoding(DecodingError::UnsupportedEncoding(name))) => {
                assert_eq!(name, "shift_jis")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_image_garbage_is_rejected() {
        assert!(image(b"definitely not a png").unwrap_err().is_decoding());
    }
}
