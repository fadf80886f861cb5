#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A request as the server received it.
#[derive(Clone, Debug)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A local HTTP/1.1 server, running on its own thread until dropped.
///
/// Routes:
///
/// - `/` replies `nice`
/// - `/echo` replies `cool`
/// - `/method` replies with the request method
/// - `/reason` replies `200 Alright`
/// - `/missing` replies `404`
/// - anything else replies with its own path
pub struct Server {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

pub fn serve() -> Server {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    let recorded = seen.clone();
    let thread = thread::Builder::new()
        .name("test-server".into())
        .spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .expect("test server runtime");

            rt.block_on(async move {
                let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
                    .await
                    .expect("bind test server");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("report address");

                loop {
                    let (stream, _) = tokio::select! {
                        accepted = listener.accept() => accepted.expect("accept"),
                        _ = &mut shutdown_rx => break,
                    };
                    let io = TokioIo::new(stream);
                    let seen = recorded.clone();

                    tokio::task::spawn(async move {
                        let service = service_fn(move |req| respond(req, seen.clone()));
                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            eprintln!("test server connection error: {:?}", err);
                        }
                    });
                }
            });
        })
        .expect("spawn test server");

    Server {
        addr: addr_rx.recv().expect("server address"),
        seen,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    }
}

impl Server {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Every request received so far, in order of completion.
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Seen {
        self.seen().pop().expect("server saw no request")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn respond(
    req: Request<Incoming>,
    seen: Arc<Mutex<Vec<Seen>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };
    let path = parts.uri.path().to_owned();

    seen.lock().unwrap().push(Seen {
        method: parts.method.clone(),
        path: path.clone(),
        headers: parts.headers,
        body,
    });

    let mut res = Response::new(Full::new(Bytes::new()));
    match path.as_str() {
        "/" => *res.body_mut() = Full::new(Bytes::from_static(b"nice")),
        "/echo" => *res.body_mut() = Full::new(Bytes::from_static(b"cool")),
        "/method" => *res.body_mut() = Full::new(Bytes::from(parts.method.as_str().to_owned())),
        "/reason" => {
            res.extensions_mut()
                .insert(hyper::ext::ReasonPhrase::from_static(b"Alright"));
        }
        "/missing" => *res.status_mut() = StatusCode::NOT_FOUND,
        other => *res.body_mut() = Full::new(Bytes::from(other.to_owned())),
    }
    Ok(res)
}
