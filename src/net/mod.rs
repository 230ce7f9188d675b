// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Futures over network sessions
//!
//! There is no network stack here. A `Session` is whatever performs
//! requests and reports back through a completion handler; `DataFuture`
//! turns that report into a `Future` of the raw payload, and its decoders
//! derive structured values from it.

pub mod decode;

pub use self::decode::JsonObject;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::Error;
use crate::future::{self, Deferred, Future};
use crate::sync::Spinlock;

/// A request handed to a `Session`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new<M: Into<String>, U: Into<String>>(method: M, url: U) -> Request {
        Request {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn get<U: Into<String>>(url: U) -> Request {
        Request::new("GET", url)
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Request {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Request {
        self.body = body.into();
        self
    }
}

/// Metadata of a completed request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code, `None` for non-HTTP transports
    pub status: Option<u16>,
    /// Name of the payload's text encoding, as announced by the server
    pub text_encoding: Option<String>,
}

impl Response {
    pub fn http(status: u16) -> Response {
        Response {
            status: Some(status),
            text_encoding: None,
        }
    }

    pub fn with_text_encoding<N: Into<String>>(mut self, name: N) -> Response {
        self.text_encoding = Some(name.into());
        self
    }

    /// Non-HTTP responses always succeed; HTTP ones need a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |status| status >= 200 && status < 300)
    }
}

/// What a session reports once a request completed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub data: Option<Vec<u8>>,
    pub response: Option<Response>,
}

pub type CompletionHandler = Box<dyn FnOnce(Result<Reply, Error>) + Send + 'static>;

/// A request in flight
pub trait DataTask: Send + Sync {
    /// Start the request; the task is created suspended
    fn resume(&self);

    /// Abandon the request. The session still reports a completion,
    /// usually a transport error.
    fn cancel(&self);
}

/// Anything able to perform requests
pub trait Session {
    fn data_task(&self, request: Request, completion: CompletionHandler) -> Box<dyn DataTask>;
}

/// Future of the raw payload of a request
///
/// Dereferences to the underlying `Future`.
pub struct DataFuture {
    future: Future<Vec<u8>, Error>,
    task: Box<dyn DataTask>,
    response: Arc<Spinlock<Option<Response>>>,
}

impl DataFuture {
    /// Create the task for `request` on `session` and resume it
    pub fn new<S: Session + ?Sized>(session: &S, request: Request) -> DataFuture {
        let (deferred, future) = future::make();
        let response = Arc::new(Spinlock::new(None));

        debug!("DataFuture: {} {}", request.method, request.url);
        let slot = response.clone();
        let task = session.data_task(request,
                                     Box::new(move |reply: Result<Reply, Error>| {
                                         complete(&deferred, &slot, reply)
                                     }));
        task.resume();

        DataFuture {
            future,
            task,
            response,
        }
    }

    pub fn task(&self) -> &dyn DataTask {
        &*self.task
    }

    /// Cancel the underlying task
    pub fn cancel(&self) {
        self.task.cancel();
    }

    /// Response metadata, once the request completed
    pub fn response(&self) -> Option<Response> {
        self.response.lock().clone()
    }

    /// Decode the payload as a JSON array or object
    pub fn json_value(&self) -> Future<JsonObject, Error> {
        self.future.then(|data| decode::json(&data))
    }

    /// Decode the payload as text, in the encoding the response announced
    /// (UTF-8 when it announced none).
    ///
    /// Only UTF-8, US-ASCII and ISO-8859-1 are understood; any other
    /// charset rejects with `DecodingError::UnsupportedEncoding`.
    pub fn string_value(&self) -> Future<String, Error> {
        let response = self.response.clone();
        self.future.then(move |data| {
            let encoding = response.lock().as_ref().and_then(|r| r.text_encoding.clone());
            decode::text(&data, encoding.as_ref().map(String::as_str))
        })
    }

    /// Decode the payload as an image
    #[cfg(feature = "image")]
    pub fn image_value(&self) -> Future<Arc<::image::DynamicImage>, Error> {
        self.future.then(|data| decode::image(&data))
    }
}

impl Deref for DataFuture {
    type Target = Future<Vec<u8>, Error>;

    fn deref(&self) -> &Self::Target {
        &self.future
    }
}

impl fmt::Debug for DataFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFuture")
            .field("pending", &self.future.is_pending())
            .field("response", &self.response())
            .finish()
    }
}

fn complete(deferred: &Deferred<Vec<u8>, Error>,
            slot: &Spinlock<Option<Response>>,
            reply: Result<Reply, Error>) {
    let Reply { data, response } = match reply {
        Ok(reply) => reply,
        Err(error) => {
            debug!("DataFuture: request failed: {}", error);
            deferred.reject(error);
            return;
        }
    };

    *slot.lock() = response.clone();

    match data {
        Some(data) if response.as_ref().map_or(true, Response::is_success) => {
            trace!("DataFuture: {} bytes received", data.len());
            deferred.resolve(data);
        }
        _ => {
            let status = response.and_then(|r| r.status);
            debug!("DataFuture: bad server response, status {:?}", status);
            deferred.reject(Error::BadServerResponse { status });
        }
    }
}

/// Extension methods issuing requests as futures
pub trait SessionExt: Session {
    fn data_future(&self, request: Request) -> DataFuture {
        DataFuture::new(self, request)
    }

    fn get(&self, url: &str) -> DataFuture {
        DataFuture::new(self, Request::get(url))
    }
}

impl<S: Session + ?Sized> SessionExt for S {}
