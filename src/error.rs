// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types
//!
//! Rejections are replayed to every late `on_failure`, so both types are
//! `Clone`; wrapped foreign errors sit behind an `Arc`.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Default rejection type of a `Future`
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The session could not complete the request
    #[error("transport error: {0}")]
    Transport(String),

    /// The request completed without a payload, or with a non-2xx status
    #[error("bad server response (status: {status:?})")]
    BadServerResponse { status: Option<u16> },

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// Raised by a user continuation
    #[error("{0}")]
    User(Arc<dyn StdError + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error raised inside a continuation
    pub fn user<E>(error: E) -> Error
        where E: StdError + Send + Sync + 'static
    {
        Error::User(Arc::new(error))
    }

    /// A user error carrying only a message
    pub fn msg<M: fmt::Display>(message: M) -> Error {
        let error: Box<dyn StdError + Send + Sync> = From::from(message.to_string());
        Error::User(Arc::from(error))
    }

    pub fn is_transport(&self) -> bool {
        match *self {
            Error::Transport(..) | Error::BadServerResponse { .. } => true,
            _ => false,
        }
    }

    pub fn is_decoding(&self) -> bool {
        match *self {
            Error::Decoding(..) => true,
            _ => false,
        }
    }
}

/// A payload could not be decoded into the requested shape
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodingError {
    #[error("invalid JSON: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("JSON payload is neither an array nor an object")]
    NotAContainer,

    #[error("payload is not valid {encoding} text")]
    Text { encoding: String },

    #[error("unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid image data: {0}")]
    Image(String),
}
