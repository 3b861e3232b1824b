//! Recording test doubles for the connection manager.

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::connection::AgentHooks;
use crate::error::{Error, Result};
use crate::registry::Page;

use super::{Connector, Transport};

/// Everything the doubles observed.
#[derive(Debug, Default)]
pub(crate) struct Record {
    pub opens: usize,
    pub sent: Vec<String>,
    pub closes: usize,
    pub reloads: Vec<(u32, String)>,
    pub enabled: Vec<u32>,
    pub disabled: Vec<u32>,
    pub alerts: Vec<String>,
}

pub(crate) type SharedRecord = Arc<Mutex<Record>>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestPage {
    pub id: u32,
}

impl TestPage {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Page for TestPage {
    fn url(&self) -> String {
        format!("http://localhost:8080/page/{}", self.id)
    }
}

/// Connector whose transports only record calls.
pub(crate) struct RecordingConnector {
    record: SharedRecord,
    /// Fail `open` synchronously while set.
    pub fail: Arc<Mutex<bool>>,
}

impl RecordingConnector {
    pub fn new(record: SharedRecord) -> Self {
        Self {
            record,
            fail: Arc::new(Mutex::new(false)),
        }
    }
}

impl Connector for RecordingConnector {
    fn open(&mut self, endpoint: &Url) -> Result<Box<dyn Transport>> {
        if *self.fail.lock() {
            return Err(Error::connection("refused by test"));
        }
        self.record.lock().opens += 1;
        Ok(Box::new(RecordingTransport {
            url: endpoint.to_string(),
            record: Arc::clone(&self.record),
        }))
    }
}

struct RecordingTransport {
    url: String,
    record: SharedRecord,
}

impl Transport for RecordingTransport {
    fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, text: String) -> Result<()> {
        self.record.lock().sent.push(text);
        Ok(())
    }

    fn close(&self) {
        self.record.lock().closes += 1;
    }
}

/// Hooks that record every callback.
pub(crate) struct RecordingHooks {
    record: SharedRecord,
}

impl RecordingHooks {
    pub fn new(record: SharedRecord) -> Self {
        Self { record }
    }
}

impl AgentHooks<TestPage> for RecordingHooks {
    fn reload_page(&mut self, page: &TestPage, data: &str) {
        self.record.lock().reloads.push((page.id, data.to_owned()));
    }

    fn on_enable_page(&mut self, page: &TestPage) {
        self.record.lock().enabled.push(page.id);
    }

    fn on_disable_page(&mut self, page: &TestPage) {
        self.record.lock().disabled.push(page.id);
    }

    fn alert(&mut self, message: &str) {
        self.record.lock().alerts.push(message.to_owned());
    }
}
