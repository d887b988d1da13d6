// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code, reason = "This is a test module")]
#![allow(missing_docs, reason = "This is a test module")]

//! Log events emitted during refresh cycles.

mod support;

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyspawn::Spawner;
use headliner::Retriever;
use support::FakeUpstream;
use tick::Clock;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// Collects formatted log output in memory.
#[derive(Debug, Clone, Default)]
struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }

    fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(output.contains(expected), "log output does not contain '{expected}', got:\n{output}");
    }

    fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn finished_cycle_is_logged_with_counts() {
    let capture = LogCapture::default();
    let _guard = tracing::subscriber::set_default(capture.subscriber());

    let retriever = Retriever::new(FakeUpstream::new([1, 2, 3]), &support::options(2), Clock::new_frozen(), Spawner::new_tokio());
    retriever.refresh(2).await.expect("list fetch succeeds");

    capture.assert_contains("refresh cycle finished");
    capture.assert_contains("ranked=3");
    capture.assert_contains("items=2");
}

#[tokio::test]
async fn list_failure_is_logged_as_warning() {
    let capture = LogCapture::default();
    let _guard = tracing::subscriber::set_default(capture.subscriber());

    let upstream = FakeUpstream::new([1]);
    upstream.fail_list(true);
    let retriever = Retriever::new(upstream, &support::options(1), Clock::new_frozen(), Spawner::new_tokio());
    retriever.refresh(1).await.expect_err("list fetch fails");

    capture.assert_contains("WARN");
    capture.assert_contains("fetching the ranked ID list failed");
}
