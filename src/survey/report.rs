// The channel for messages meant for the person running the program.

#[cfg(test)]
use std::sync::Mutex;

pub trait Reporter {
    fn report(&self, message: &str);
}

/// Prints the messages on the standard error, one block per message.
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Keeps the messages in memory.
#[cfg(test)]
#[derive(Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<String>>,
}

#[cfg(test)]
impl CollectingReporter {
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
impl Reporter for CollectingReporter {
    fn report(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut m) => m.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
