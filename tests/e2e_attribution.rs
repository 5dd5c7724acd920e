// logwhence - tests/e2e_attribution.rs
//
// End-to-end tests for attribution and severity mapping through the public
// adapter surface.
//
// Adapters run against a deterministic `FixedStack` wherever the expected
// frame must be exact; one test goes through the real backtrace walker.

use logwhence::adapters::log4j::{Log4jLevel, LoggingEvent as Log4jEvent};
use logwhence::adapters::log4j2::{Log4j2Level, Log4jLogEvent};
use logwhence::adapters::logback::{LogbackLevel, LoggingEvent as LogbackEvent};
use logwhence::adapters::{Log4j2Adapter, Log4jAdapter, LogbackAdapter};
use logwhence::app::sink::MemorySink;
use logwhence::core::locator::FixedStack;
use logwhence::core::model::{StackFrame, Throwable};
use logwhence::core::source::{ExceptionSourceProvider, MessageSourceProvider};
use logwhence::{AdapterState, FrameworkAdapter, Severity, SkipPolicy, SourceLocation};
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

fn frame(class: &str, method: &str) -> StackFrame {
    StackFrame::new(class, method, None, 0)
}

/// Live stack of the reference scenario, innermost first.
fn helper_stack() -> Arc<FixedStack> {
    Arc::new(FixedStack::new(vec![
        frame("pkg.internal.Helper", "x"),
        frame("pkg.internal.Helper2", "y"),
        frame("app.Service", "doWork"),
        frame("app.Main", "main"),
    ]))
}

/// A live stack that is all adapter machinery.
fn adapter_deep_stack() -> Arc<FixedStack> {
    Arc::new(FixedStack::new(vec![
        frame("logwhence::adapters::log4j2", "normalize"),
        frame("org.apache.logging.log4j.core.Logger", "log"),
        frame("org.apache.logging.log4j.spi.AbstractLogger", "error"),
        frame("app.Scheduler", "tick"),
    ]))
}

// =============================================================================
// Attribution
// =============================================================================

/// Skip count plus exclusion prefix lands on the first application frame.
#[test]
fn e2e_skip_and_exclusion_find_application_frame() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4jAdapter::with_policy(sink.clone(), SkipPolicy::new(2, ["pkg.internal"]))
        .with_stack(helper_stack());

    adapter.append(Some(&Log4jEvent::new(Log4jLevel::Info, "app.Service", "working")));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source_location.class_name(), Some("app.Service"));
    assert_eq!(events[0].source_location.method_name(), Some("doWork"));
}

/// A throwable's own trace wins over whatever the live stack looks like.
#[test]
fn e2e_throwable_trace_beats_live_stack() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4j2Adapter::new(sink.clone()).with_stack(adapter_deep_stack());

    let mut event = Log4jLogEvent::new(Log4j2Level::Error, "app.Worker", "job failed");
    event.thrown = Some(
        Throwable::new("java.lang.IllegalStateException", Some("no input"))
            .with_frames(vec![frame("app.Worker", "run"), frame("app.Main", "main")]),
    );
    adapter.append(Some(&event));

    let location = &sink.events()[0].source_location;
    assert_eq!(location.class_name(), Some("app.Worker"));
    assert_eq!(location.method_name(), Some("run"));
}

/// log4j's string-only throwable is parsed and attributed the same way.
#[test]
fn e2e_log4j_string_throwable_is_attributed() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4jAdapter::new(sink.clone()).with_stack(adapter_deep_stack());

    let mut event = Log4jEvent::new(Log4jLevel::Error, "app.Importer", "import aborted");
    event.throwable_str_rep = Some(
        [
            "java.io.IOException: disk full",
            "\tat app.Importer.flush(Importer.java:88)",
            "\tat app.Importer.run(Importer.java:40)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    adapter.append(Some(&event));

    let record = &sink.events()[0];
    assert_eq!(record.source_location.method_name(), Some("flush"));
    assert_eq!(record.source_location.file_name(), Some("Importer.java"));
    assert_eq!(record.source_location.line_number(), 88);
    assert_eq!(
        record.throwable.as_ref().map(|t| t.type_name.as_str()),
        Some("java.io.IOException")
    );
}

/// Nothing qualifies: the unknown sentinel, not an error.
#[test]
fn e2e_exhausted_stack_is_unknown() {
    let sink = Arc::new(MemorySink::new());
    let adapter = LogbackAdapter::with_policy(sink.clone(), SkipPolicy::new(10, ["app."]))
        .with_stack(helper_stack());

    adapter.append(Some(&LogbackEvent::new(LogbackLevel::Warn, "app", "low disk")));

    let location = &sink.events()[0].source_location;
    assert!(location.is_unknown());
    assert_eq!(location.method_name(), None);
    assert_eq!(location.line_number(), 0);
}

/// The real stack walker attributes a call straight from this test.
#[test]
fn e2e_live_stack_attributes_caller() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4j2Adapter::with_policy(sink.clone(), SkipPolicy::framework_default(0, &[]));

    adapter.append(Some(&Log4jLogEvent::new(Log4j2Level::Info, "app", "live")));

    let location = &sink.events()[0].source_location;
    assert_eq!(location.class_name(), Some("e2e_attribution"));
    assert_eq!(location.method_name(), Some("e2e_live_stack_attributes_caller"));
}

/// Each adapter's out-of-the-box policy on the real stack lands on the
/// function that called `append`.
#[test]
fn e2e_default_policies_attribute_live_caller() {
    let sink = Arc::new(MemorySink::new());
    let log4j = Log4jAdapter::new(sink.clone());
    let log4j2 = Log4j2Adapter::new(sink.clone());
    let logback = LogbackAdapter::new(sink.clone());

    log4j.append(Some(&Log4jEvent::new(Log4jLevel::Info, "a", "one")));
    log4j2.append(Some(&Log4jLogEvent::new(Log4j2Level::Info, "b", "two")));
    logback.append(Some(&LogbackEvent::new(LogbackLevel::Info, "c", "three")));

    let events = sink.events();
    assert_eq!(events.len(), 3);
    for event in &events {
        assert_eq!(
            event.source_location.class_name(),
            Some("e2e_attribution"),
            "{}",
            event.log_system
        );
        assert_eq!(
            event.source_location.method_name(),
            Some("e2e_default_policies_attribute_live_caller"),
            "{}",
            event.log_system
        );
    }
}

/// Every provider route reports through the same accessor contract.
#[test]
fn e2e_provider_routes_agree() {
    let site = StackFrame::new("app.Billing", "charge", Some("Billing.java"), 19);
    let explicit = SourceLocation::new(Some("charge"), Some("app.Billing"), Some("Billing.java"), 19);
    let from_frame = SourceLocation::from_frame(&site);
    let from_stack = SourceLocation::from_live_stack(
        &SkipPolicy::new(0, Vec::<String>::new()),
        &FixedStack::new(vec![site.clone()]),
    );

    let exception = ExceptionSourceProvider::new(
        &Throwable::new("app.CardDeclined", None).with_frames(vec![site.clone()]),
    );

    let providers: [&dyn MessageSourceProvider; 4] =
        [&explicit, &from_frame, &from_stack, &exception];
    for provider in providers {
        assert_eq!(provider.class_name(), Some("app.Billing"));
        assert_eq!(provider.method_name(), Some("charge"));
        assert_eq!(provider.file_name(), Some("Billing.java"));
        assert_eq!(provider.line_number(), 19);
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Each framework's most severe level lands on the same unified ordinal.
#[test]
fn e2e_fatal_equivalents_are_critical() {
    let sink = Arc::new(MemorySink::new());
    let stack = helper_stack();
    let log4j = Log4jAdapter::new(sink.clone()).with_stack(stack.clone());
    let log4j2 = Log4j2Adapter::new(sink.clone()).with_stack(stack.clone());
    let logback = LogbackAdapter::new(sink.clone()).with_stack(stack);

    log4j.append(Some(&Log4jEvent::new(Log4jLevel::Fatal, "a", "down")));
    log4j2.append(Some(&Log4jLogEvent::new(Log4j2Level::Fatal, "b", "down")));
    let mut marked = LogbackEvent::new(LogbackLevel::Error, "c", "down");
    marked.markers.push("FATAL".to_string());
    logback.append(Some(&marked));

    let events = sink.events();
    assert_eq!(events.len(), 3);
    for event in &events {
        assert_eq!(event.severity, Severity::Critical, "{}", event.log_system);
        assert_eq!(event.severity.ordinal(), Severity::Critical.ordinal());
    }
    assert_eq!(
        events.iter().map(|e| e.log_system).collect::<Vec<_>>(),
        vec!["Log4j", "Log4j2", "Logback"]
    );
}

#[test]
fn e2e_debug_and_trace_are_verbose() {
    let sink = Arc::new(MemorySink::new());
    let stack = helper_stack();
    let log4j = Log4jAdapter::new(sink.clone()).with_stack(stack.clone());
    let log4j2 = Log4j2Adapter::new(sink.clone()).with_stack(stack.clone());
    let logback = LogbackAdapter::new(sink.clone()).with_stack(stack);

    log4j.append(Some(&Log4jEvent::new(Log4jLevel::Debug, "a", "d")));
    log4j.append(Some(&Log4jEvent::new(Log4jLevel::Trace, "a", "t")));
    log4j2.append(Some(&Log4jLogEvent::new(Log4j2Level::Debug, "b", "d")));
    log4j2.append(Some(&Log4jLogEvent::new(Log4j2Level::Trace, "b", "t")));
    logback.append(Some(&LogbackEvent::new(LogbackLevel::Debug, "c", "d")));
    logback.append(Some(&LogbackEvent::new(LogbackLevel::Trace, "c", "t")));

    let events = sink.events();
    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| e.severity == Severity::Verbose));
}

#[test]
fn e2e_off_level_never_reaches_sink() {
    let sink = Arc::new(MemorySink::new());
    let stack = helper_stack();
    let log4j = Log4jAdapter::new(sink.clone()).with_stack(stack.clone());
    let log4j2 = Log4j2Adapter::new(sink.clone()).with_stack(stack.clone());
    let logback = LogbackAdapter::new(sink.clone()).with_stack(stack);

    log4j.append(Some(&Log4jEvent::new(Log4jLevel::Off, "a", "silent")));
    log4j2.append(Some(&Log4jLogEvent::new(Log4j2Level::Off, "b", "silent")));
    logback.append(Some(&LogbackEvent::new(LogbackLevel::Off, "c", "silent")));

    assert!(sink.events().is_empty());
    // Filtered before the lazy start: no registration at all.
    assert_eq!(sink.start_attempts(), 0);
    assert_eq!(log4j.state(), AdapterState::Uninitialized);
    assert_eq!(log4j2.state(), AdapterState::Uninitialized);
    assert_eq!(logback.state(), AdapterState::Uninitialized);
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Concurrent first appends against a refusing sink: one start attempt,
/// nothing written, and the adapter settles in Failed.
#[test]
fn e2e_concurrent_first_append_starts_once() {
    let sink = Arc::new(MemorySink::failing());
    let adapter = Log4j2Adapter::new(sink.clone()).with_stack(helper_stack());
    let event = Log4jLogEvent::new(Log4j2Level::Error, "app", "burst");

    std::thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| {
                for _ in 0..8 {
                    adapter.append(Some(&event));
                }
            });
        }
    });

    assert_eq!(sink.start_attempts(), 1);
    assert!(sink.events().is_empty());
    assert_eq!(adapter.state(), AdapterState::Failed);

    // Failure is permanent: an explicit start does not retry.
    assert_eq!(adapter.start(), AdapterState::Failed);
    assert_eq!(sink.start_attempts(), 1);
}

#[test]
fn e2e_concurrent_appends_on_healthy_sink() {
    let sink = Arc::new(MemorySink::new());
    let adapter = LogbackAdapter::new(sink.clone()).with_stack(helper_stack());
    let event = LogbackEvent::new(LogbackLevel::Info, "app", "tick");

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    adapter.append(Some(&event));
                }
            });
        }
    });

    assert_eq!(sink.start_attempts(), 1);
    assert_eq!(sink.events().len(), 200);
    assert_eq!(adapter.state(), AdapterState::Started);
}

#[test]
fn e2e_append_after_stop_is_dropped() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4jAdapter::new(sink.clone()).with_stack(helper_stack());
    assert_eq!(adapter.state(), AdapterState::Uninitialized);

    adapter.append(Some(&Log4jEvent::new(Log4jLevel::Info, "a", "before")));
    assert_eq!(adapter.state(), AdapterState::Started);

    adapter.stop();
    adapter.stop();
    adapter.append(Some(&Log4jEvent::new(Log4jLevel::Info, "a", "after")));
    adapter.append(None);

    assert_eq!(adapter.state(), AdapterState::Stopped);
    assert_eq!(sink.shutdowns(), 1);
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "before");
}

#[test]
fn e2e_stop_before_start_never_registers() {
    let sink = Arc::new(MemorySink::new());
    let adapter = Log4j2Adapter::new(sink.clone()).with_stack(helper_stack());
    adapter.stop();
    adapter.append(Some(&Log4jLogEvent::new(Log4j2Level::Info, "a", "late")));

    assert_eq!(adapter.state(), AdapterState::Stopped);
    assert_eq!(sink.start_attempts(), 0);
    assert_eq!(sink.shutdowns(), 0);
}
