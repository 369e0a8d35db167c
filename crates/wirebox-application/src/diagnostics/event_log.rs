use super::{TraceBuilder, TraceEvent};

const INDENT: &str = "  ";

/// Trace builder producing one indented line per event
#[derive(Debug, Default)]
pub struct EventLogTraceBuilder {
    lines: Vec<String>,
    depth: usize,
}

impl EventLogTraceBuilder {
    fn push(&mut self, line: String) {
        self.lines
            .push(format!("{}{line}", INDENT.repeat(self.depth)));
    }
}

impl TraceBuilder for EventLogTraceBuilder {
    type Content = Vec<String>;

    fn record(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::OperationStart { service } => {
                self.push(format!("Resolve operation started: {service}"));
            }
            TraceEvent::RequestStart {
                service,
                registration,
            } => {
                self.depth += 1;
                self.push(format!("Resolve request: {service} <- {registration}"));
            }
            TraceEvent::MiddlewareStart { middleware, phase } => {
                self.depth += 1;
                self.push(format!("Entering {middleware} [{phase}]"));
            }
            TraceEvent::MiddlewareSuccess { middleware } => {
                self.push(format!("Exiting {middleware}"));
                self.depth = self.depth.saturating_sub(1);
            }
            TraceEvent::MiddlewareFailure { middleware, error } => {
                self.push(format!("Exiting {middleware} with error: {error}"));
                self.depth = self.depth.saturating_sub(1);
            }
            TraceEvent::RequestSuccess { service, activated } => {
                let how = if activated { "activated" } else { "reused" };
                self.push(format!("Request succeeded: {service} ({how})"));
                self.depth = self.depth.saturating_sub(1);
            }
            TraceEvent::RequestFailure { service, error } => {
                self.push(format!("Request failed: {service}: {error}"));
                self.depth = self.depth.saturating_sub(1);
            }
            TraceEvent::OperationSuccess => {
                self.push("Resolve operation succeeded".to_string());
            }
            TraceEvent::OperationFailure { error } => {
                self.push(format!("Resolve operation failed: {error}"));
            }
        }
    }

    fn finish(self) -> Vec<String> {
        self.lines
    }
}
