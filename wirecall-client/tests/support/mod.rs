//! Scripted transports and providers for driving `invoke` end to end.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use wirecall_client::{
    CallConfig, CallContext, CallHeader, CallOption, ClientError, ClientStream, Code,
    CompressionEncoding, Metadata, RetryCursor, Transport, TransportProvider, WriteOptions,
    encode,
};

#[derive(Clone, PartialEq, prost::Message)]
pub struct EchoRequest {
    #[prost(string, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EchoReply {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(uint32, tag = "2")]
    pub attempt: u32,
}

pub fn request(text: &str) -> EchoRequest {
    EchoRequest { text: text.into() }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// What a stream on a [`MockTransport`] plays back.
#[derive(Clone)]
pub struct Script {
    pub header: Result<Metadata, ClientError>,
    pub frames: Vec<Bytes>,
    /// Returned by `recv_data` once every frame has been read.
    pub data_err: Option<ClientError>,
    pub trailer: Metadata,
    pub code: Code,
    pub desc: String,
}

impl Script {
    /// A clean OK response carrying `reply`.
    pub fn reply(reply: &EchoReply) -> Self {
        Self {
            header: Ok(Metadata::empty()),
            frames: vec![encode(reply, CompressionEncoding::Identity).unwrap()],
            data_err: None,
            trailer: Metadata::empty(),
            code: Code::Ok,
            desc: String::new(),
        }
    }

    /// A response that ends with a non-OK status and no message.
    pub fn status(code: Code, desc: &str) -> Self {
        Self {
            header: Ok(Metadata::empty()),
            frames: vec![],
            data_err: None,
            trailer: Metadata::empty(),
            code,
            desc: desc.into(),
        }
    }

    pub fn with_header(mut self, header: Metadata) -> Self {
        self.header = Ok(header);
        self
    }

    pub fn with_trailer(mut self, trailer: Metadata) -> Self {
        self.trailer = trailer;
        self
    }

    pub fn failing_header(mut self, err: ClientError) -> Self {
        self.header = Err(err);
        self
    }

    pub fn failing_data(mut self, err: ClientError) -> Self {
        self.frames.clear();
        self.data_err = Some(err);
        self
    }
}

pub struct MockStream {
    script: Script,
    frames: VecDeque<Bytes>,
}

impl ClientStream for MockStream {
    async fn header(&mut self) -> Result<Metadata, ClientError> {
        self.script.header.clone()
    }

    async fn recv_data(&mut self) -> Result<Option<Bytes>, ClientError> {
        if let Some(frame) = self.frames.pop_front() {
            return Ok(Some(frame));
        }
        match self.script.data_err.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    fn trailer(&self) -> Metadata {
        self.script.trailer.clone()
    }

    fn status_code(&self) -> Code {
        self.script.code
    }

    fn status_desc(&self) -> String {
        self.script.desc.clone()
    }
}

/// A transport that records every stream it opens, writes and closes.
pub struct MockTransport {
    pub name: &'static str,
    open_err: Option<ClientError>,
    write_err: Option<ClientError>,
    script: Script,
    attempts: AtomicUsize,
    opened: AtomicUsize,
    written: Mutex<Vec<Bytes>>,
    closed: Mutex<Vec<Option<String>>>,
}

impl MockTransport {
    pub fn new(name: &'static str, script: Script) -> Arc<Self> {
        Self::build(name, script, None, None)
    }

    /// A transport whose streams fail to open.
    pub fn failing_open(name: &'static str, err: ClientError) -> Arc<Self> {
        Self::build(name, Script::status(Code::Ok, ""), Some(err), None)
    }

    /// A transport whose request writes fail.
    pub fn failing_write(name: &'static str, err: ClientError) -> Arc<Self> {
        Self::build(name, Script::status(Code::Ok, ""), None, Some(err))
    }

    fn build(
        name: &'static str,
        script: Script,
        open_err: Option<ClientError>,
        write_err: Option<ClientError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            open_err,
            write_err,
            script,
            attempts: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
            written: Mutex::new(vec![]),
            closed: Mutex::new(vec![]),
        })
    }

    /// Number of `new_stream` calls, including those that failed.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<Bytes> {
        self.written.lock().unwrap().clone()
    }

    /// Errors passed to `close_stream`, one entry per closed stream.
    pub fn closed(&self) -> Vec<Option<String>> {
        self.closed.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    type Stream = MockStream;

    async fn new_stream(
        &self,
        _ctx: &CallContext,
        _header: &CallHeader,
    ) -> Result<MockStream, ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.open_err {
            return Err(err.clone());
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockStream {
            frames: self.script.frames.iter().cloned().collect(),
            script: self.script.clone(),
        })
    }

    async fn write(
        &self,
        _stream: &mut MockStream,
        data: Bytes,
        opts: WriteOptions,
    ) -> Result<(), ClientError> {
        assert_eq!(opts, WriteOptions::UNARY);
        if let Some(err) = &self.write_err {
            return Err(err.clone());
        }
        self.written.lock().unwrap().push(data);
        Ok(())
    }

    fn close_stream(&self, _stream: MockStream, err: Option<&ClientError>) {
        self.closed.lock().unwrap().push(err.map(|e| e.to_string()));
    }
}

/// Hands out a fixed sequence of transports, then fails.
#[derive(Default)]
pub struct ScriptedProvider {
    picks: Mutex<VecDeque<Arc<MockTransport>>>,
    cursors: Mutex<Vec<RetryCursor>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(picks: Vec<Arc<MockTransport>>) -> Self {
        Self {
            picks: Mutex::new(picks.into()),
            ..Default::default()
        }
    }

    /// Number of times `next` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Cursors passed to `next`, in call order.
    pub fn cursors(&self) -> Vec<RetryCursor> {
        self.cursors.lock().unwrap().clone()
    }
}

impl TransportProvider for ScriptedProvider {
    type Transport = MockTransport;

    async fn next(
        &self,
        _ctx: &CallContext,
        cursor: RetryCursor,
    ) -> Result<(Arc<MockTransport>, RetryCursor), ClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.cursors.lock().unwrap().push(cursor);
        match self.picks.lock().unwrap().pop_front() {
            Some(transport) => Ok((transport, RetryCursor::new(call as u64))),
            None => Err(ClientError::new(Code::Unavailable, "no transport available")),
        }
    }
}

/// Records its hook calls into a shared log.
pub struct Recorder {
    pub name: &'static str,
    pub fail_before: bool,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            fail_before: false,
            log: Arc::clone(log),
        }
    }

    pub fn failing(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            fail_before: true,
            ..Self::new(name, log)
        }
    }
}

impl CallOption for Recorder {
    fn before(&self, _config: &mut CallConfig) -> Result<(), ClientError> {
        self.log.lock().unwrap().push(format!("{}.before", self.name));
        if self.fail_before {
            return Err(ClientError::new(Code::InvalidArgument, "rejected by option"));
        }
        Ok(())
    }

    fn after(&self, _config: &CallConfig) {
        self.log.lock().unwrap().push(format!("{}.after", self.name));
    }
}
