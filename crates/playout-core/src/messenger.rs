// crates/playout-core/src/messenger.rs
//
// Fan-out notification sink. The messenger itself is a thin dispatcher —
// rate limiting on repeated errors lives in the iterator, which is the only
// caller that knows whether a message is a repeat of the last one it sent.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Severity::Error,
            "WARNING" => Severity::Warning,
            "INFO" => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

pub trait Sink: Send + Sync {
    fn send(&self, severity: Severity, msg: &str);
}

pub struct Messenger {
    sinks: Vec<Box<dyn Sink>>,
}

impl Messenger {
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn debug(&self, msg: &str) {
        self.dispatch(Severity::Debug, msg);
    }
    pub fn info(&self, msg: &str) {
        self.dispatch(Severity::Info, msg);
    }
    pub fn warning(&self, msg: &str) {
        self.dispatch(Severity::Warning, msg);
    }
    pub fn error(&self, msg: &str) {
        self.dispatch(Severity::Error, msg);
    }

    fn dispatch(&self, severity: Severity, msg: &str) {
        for sink in &self.sinks {
            sink.send(severity, msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink(Arc<Mutex<Vec<(Severity, String)>>>);
    impl Sink for RecordingSink {
        fn send(&self, severity: Severity, msg: &str) {
            self.0.lock().unwrap().push((severity, msg.to_string()));
        }
    }

    #[test]
    fn fans_out_to_all_sinks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let messenger = Messenger::new(vec![
            Box::new(RecordingSink(log.clone())),
            Box::new(RecordingSink(log.clone())),
        ]);
        messenger.error("boom");
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(log.lock().unwrap()[0].0, Severity::Error);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(Severity::parse("error"), Severity::Error);
        assert_eq!(Severity::parse("Warning"), Severity::Warning);
        assert_eq!(Severity::parse("nonsense"), Severity::Debug);
    }
}
