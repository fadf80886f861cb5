//! A scripted engine handle for unit tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{Callbacks, Handle, Opt};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// What the handle reports during `perform`, in order.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Event {
    Header(&'static [u8]),
    Body(&'static [u8]),
    /// Drain the request body through the read callback.
    Upload,
}

#[derive(Debug)]
pub(crate) struct MockHandle {
    id: usize,
    options: Vec<Opt>,
    history: Vec<Opt>,
    resets: usize,
    dirty: bool,
    performs: usize,
    uploaded: Vec<u8>,
    script: Vec<Event>,
    failure: Option<&'static str>,
    reject: Option<fn(&Opt) -> bool>,
}

#[derive(Debug)]
pub(crate) struct MockError(&'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for MockError {}

impl MockHandle {
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.options.is_empty() && !self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn resets(&self) -> usize {
        self.resets
    }

    pub(crate) fn performs(&self) -> usize {
        self.performs
    }

    /// Options applied since the last reset.
    pub(crate) fn options(&self) -> &[Opt] {
        &self.options
    }

    /// Every option ever applied, across resets.
    pub(crate) fn history(&self) -> &[Opt] {
        &self.history
    }

    pub(crate) fn uploaded(&self) -> &[u8] {
        &self.uploaded
    }

    /// Report these events on every perform.
    pub(crate) fn respond(mut self, script: &[Event]) -> MockHandle {
        self.script = script.to_vec();
        self
    }

    /// Fail every perform, after the scripted events.
    pub(crate) fn fail_with(mut self, message: &'static str) -> MockHandle {
        self.failure = Some(message);
        self
    }

    /// Refuse options matching `reject`.
    pub(crate) fn reject_when(mut self, reject: fn(&Opt) -> bool) -> MockHandle {
        self.reject = Some(reject);
        self
    }

    fn upload(&mut self, callbacks: &dyn Callbacks) {
        if !callbacks.has_payload() {
            return;
        }
        // Small reads, so bodies arrive in several pieces.
        let mut buf = [0u8; 7];
        loop {
            let n = callbacks.read_payload(&mut buf);
            if n == 0 {
                break;
            }
            self.uploaded.extend_from_slice(&buf[..n]);
        }
    }
}

impl Handle for MockHandle {
    type Error = MockError;

    fn create() -> MockHandle {
        MockHandle {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            options: Vec::new(),
            history: Vec::new(),
            resets: 0,
            dirty: false,
            performs: 0,
            uploaded: Vec::new(),
            script: Vec::new(),
            failure: None,
            reject: None,
        }
    }

    fn set_option(&mut self, option: Opt) -> Result<(), MockError> {
        if self.reject.map_or(false, |reject| reject(&option)) {
            return Err(MockError("option refused"));
        }
        self.history.push(option.clone());
        self.options.push(option);
        Ok(())
    }

    fn perform(&mut self, callbacks: &dyn Callbacks) -> Result<(), MockError> {
        self.performs += 1;
        let script = self.script.clone();
        if !script.iter().any(|event| matches!(event, Event::Upload)) {
            self.upload(callbacks);
        }
        for event in script {
            match event {
                Event::Header(line) => callbacks.write_header(line),
                Event::Body(chunk) => callbacks.write_body(chunk),
                Event::Upload => self.upload(callbacks),
            }
        }
        match self.failure {
            Some(message) => Err(MockError(message)),
            None => Ok(()),
        }
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.options.clear();
        self.dirty = false;
    }
}
