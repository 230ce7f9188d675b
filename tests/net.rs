extern crate deferro;
extern crate env_logger;
extern crate serde_json;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use deferro::net::{CompletionHandler, DataTask, Reply, Request, Response, Session, SessionExt};
use deferro::{DecodingError, Error};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Completes every request synchronously with a canned reply once resumed
struct MockSession {
    reply: Mutex<Option<Result<Reply, Error>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockSession {
    fn new(reply: Result<Reply, Error>) -> MockSession {
        MockSession {
            reply: Mutex::new(Some(reply)),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn replying(data: &[u8], response: Option<Response>) -> MockSession {
        MockSession::new(Ok(Reply {
            data: Some(data.to_vec()),
            response,
        }))
    }
}

struct MockTask {
    completion: Mutex<Option<CompletionHandler>>,
    reply: Mutex<Option<Result<Reply, Error>>>,
    cancelled: Arc<AtomicBool>,
}

impl DataTask for MockTask {
    fn resume(&self) {
        // Without a canned reply the request stays in flight
        let reply = match self.reply.lock().unwrap().take() {
            Some(reply) => reply,
            None => return,
        };
        if let Some(completion) = self.completion.lock().unwrap().take() {
            completion(reply);
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(completion) = self.completion.lock().unwrap().take() {
            completion(Err(Error::Transport("cancelled".to_owned())));
        }
    }
}

impl Session for MockSession {
    fn data_task(&self, request: Request, completion: CompletionHandler) -> Box<dyn DataTask> {
        self.requests.lock().unwrap().push(request);
        Box::new(MockTask {
            completion: Mutex::new(Some(completion)),
            reply: Mutex::new(self.reply.lock().unwrap().take()),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[test]
fn test_successful_http_response_resolves() {
    init();

    let session = MockSession::replying(b"payload", Some(Response::http(200)));
    let future = session.get("http://example.com/data");

    assert_eq!(future.result().unwrap().unwrap(), b"payload".to_vec());
    assert_eq!(future.response(), Some(Response::http(200)));

    let requests = session.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "http://example.com/data");
}

#[test]
fn test_error_status_rejects_with_bad_response() {
    init();

    let session = MockSession::replying(b"not found", Some(Response::http(404)));
    let future = session.get("http://example.com/missing");

    match future.result() {
        Some(Err(Error::BadServerResponse { status: Some(404) })) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_data_rejects() {
    init();

    let session = MockSession::new(Ok(Reply {
        data: None,
        response: Some(Response::http(204)),
    }));
    let future = session.get("http://example.com/empty");

    match future.result() {
        Some(Err(Error::BadServerResponse { status: Some(204) })) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_non_http_response_resolves() {
    init();

    let session = MockSession::replying(b"local", Some(Response::default()));
    assert_eq!(session.get("file:///tmp/local").result().unwrap().unwrap(), b"local".to_vec());

    let session = MockSession::replying(b"bare", None);
    assert_eq!(session.get("data:,bare").result().unwrap().unwrap(), b"bare".to_vec());
}

#[test]
fn test_transport_error_rejects() {
    init();

    let session = MockSession::new(Err(Error::Transport("connection refused".to_owned())));
    let future = session.get("http://example.com/");

    let seen = Arc::new(Mutex::new(None));
    let s = seen.clone();
    future.on_failure(move |e| *s.lock().unwrap() = Some(e.is_transport()));

    assert_eq!(*seen.lock().unwrap(), Some(true));
    assert_eq!(future.response(), None);
}

#[test]
fn test_json_value() {
    init();

    let session = MockSession::replying(br#"{"id": 7, "tags": ["a", "b"]}"#, Some(Response::http(200)));
    let object = session.get("http://example.com/item").json_value();

    let map = match object.result() {
        Some(Ok(object)) => object.as_map().cloned().unwrap(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(map.get("id"), Some(&serde_json::json!(7)));

    let session = MockSession::replying(b"\"just a string\"", Some(Response::http(200)));
    match session.get("http://example.com/scalar").json_value().result() {
        Some(Err(Error::Decoding(DecodingError::NotAContainer))) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_string_value_uses_announced_encoding() {
    init();

    let session = MockSession::replying(&[0x63, 0x61, 0x66, 0xe9],
                                        Some(Response::http(200).with_text_encoding("iso-8859-1")));
    let text = session.get("http://example.com/menu").string_value();
    assert_eq!(text.result().unwrap().unwrap(), "café");

    let session = MockSession::replying(&[0x63, 0x61, 0x66, 0xe9], Some(Response::http(200)));
    let text = session.get("http://example.com/menu").string_value();
    assert!(text.result().unwrap().unwrap_err().is_decoding());
}

#[test]
fn test_decoders_pass_request_errors_through() {
    init();

    let session = MockSession::replying(b"{}", Some(Response::http(500)));
    match session.get("http://example.com/").json_value().result() {
        Some(Err(Error::BadServerResponse { status: Some(500) })) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_request_builder() {
    let request = Request::new("POST", "http://example.com/upload")
        .header("Content-Type", "application/json")
        .body(&b"{}"[..]);

    assert_eq!(request.method, "POST");
    assert_eq!(request.headers,
               vec![("Content-Type".to_owned(), "application/json".to_owned())]);
    assert_eq!(request.body, b"{}".to_vec());
}

struct PendingSession {
    cancelled: Arc<AtomicBool>,
}

impl Session for PendingSession {
    fn data_task(&self, _request: Request, completion: CompletionHandler) -> Box<dyn DataTask> {
        Box::new(MockTask {
            completion: Mutex::new(Some(completion)),
            reply: Mutex::new(None),
            cancelled: self.cancelled.clone(),
        })
    }
}

#[test]
fn test_cancel_rejects_pending_request() {
    init();

    let cancelled = Arc::new(AtomicBool::new(false));
    let session = PendingSession { cancelled: cancelled.clone() };
    let future = session.data_future(Request::get("http://example.com/slow"));
    assert!(future.is_pending());

    future.cancel();
    assert!(cancelled.load(Ordering::SeqCst));
    assert!(future.result().unwrap().unwrap_err().is_transport());
}

#[test]
fn test_string_value_rejects_unknown_charset() {
    init();

    let session = MockSession::replying(b"text", Some(Response::http(200).with_text_encoding("Shift_JIS")));
    match session.get("http://example.com/jp").string_value().result() {
        Some(Err(Error::Decoding(DecodingError::UnsupportedEncoding(name)))) => {
            assert_eq!(name, "shift_jis")
        }
        other => panic!("unexpected {:?}", other),
    }
}
