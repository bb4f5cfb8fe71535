//! TestLogger - Per-case reports for conformance runs
//!
//! Every finished case gets a short report: the files it was read from, the
//! errors each parse phase found and one result line. Reports go to a colored
//! terminal, to any writer as plain text, or out as JSON lines for CI.
//!
//! Parser and golden-file internals report through `tracing`; this logger is
//! only the per-case summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use grammar_conformance::harness::{OutputFormat, SharedLogger, TestLogger, TestRunner};
//!
//! let logger = TestLogger::new()
//!     .with_format(OutputFormat::Json)
//!     .with_timestamps(false);
//! let runner = TestRunner::new().with_logger(SharedLogger::new(logger));
//! ```

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::context::{CaseDiagnostics, TestContext};
use super::traits::TestResult;

/// Severity of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum LogLevel {
    /// Files, diagnostics and passing results
    #[default]
    Info,
    /// Skipped cases
    Warn,
    /// Failed and errored cases
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

/// How report lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Indented text, colored on a terminal
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    case: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<f64>,
}

enum Sink {
    Terminal(StandardStream),
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    fn write_line(
        &mut self,
        prefix: &str,
        body: &str,
        color: Option<&ColorSpec>,
    ) -> io::Result<()> {
        match self {
            Sink::Terminal(out) => {
                write!(out, "{prefix}")?;
                if let Some(spec) = color {
                    out.set_color(spec)?;
                    write!(out, "{body}")?;
                    out.reset()?;
                } else {
                    write!(out, "{body}")?;
                }
                writeln!(out)?;
                out.flush()
            }
            Sink::Writer(out) => {
                writeln!(out, "{prefix}{body}")?;
                out.flush()
            }
        }
    }
}

/// Writes the report of each case
pub struct TestLogger {
    level: LogLevel,
    sink: Sink,
    format: OutputFormat,
    timestamps: bool,
    case: Option<String>,
    sections: Vec<String>,
    started: Instant,
}

impl Default for TestLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLogger {
    /// Human-readable report on stdout, colored when it is a terminal
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            sink: Sink::Terminal(StandardStream::stdout(ColorChoice::Auto)),
            format: OutputFormat::Human,
            timestamps: true,
            case: None,
            sections: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Lines below `level` are dropped
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Prefix each line with the time since the logger was created
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Write uncolored lines to `output` instead of stdout
    pub fn with_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.sink = Sink::Writer(Box::new(output));
        self
    }

    fn elapsed_ms(&self) -> Option<f64> {
        self.timestamps.then(|| self.started.elapsed().as_secs_f64() * 1000.0)
    }

    fn emit(
        &mut self,
        level: LogLevel,
        message: &str,
        outcome: Option<(&'static str, Duration)>,
    ) {
        if level < self.level {
            return;
        }
        // A closed stdout or a failing writer must not abort the run.
        let _ = match self.format {
            OutputFormat::Human => self.emit_human(level, message, outcome.is_some()),
            OutputFormat::Json => self.emit_json(level, message, outcome),
        };
    }

    fn emit_human(&mut self, level: LogLevel, message: &str, is_result: bool) -> io::Result<()> {
        let mut prefix = String::new();
        if let Some(ms) = self.elapsed_ms() {
            prefix.push_str(&format!("[{ms:>8.3}ms] "));
        }
        prefix.push_str(&format!("[{}] ", level.as_str()));
        if let Some(case) = &self.case {
            prefix.push_str(case);
            prefix.push(' ');
        }
        prefix.push_str(&"  ".repeat(self.sections.len()));

        let highlight = (is_result || level > LogLevel::Info).then(|| {
            let mut spec = ColorSpec::new();
            spec.set_fg(Some(level.color())).set_bold(is_result);
            spec
        });
        self.sink.write_line(&prefix, message, highlight.as_ref())
    }

    fn emit_json(
        &mut self,
        level: LogLevel,
        message: &str,
        outcome: Option<(&'static str, Duration)>,
    ) -> io::Result<()> {
        let line = JsonLine {
            elapsed_ms: self.elapsed_ms(),
            level: level.as_str(),
            case: self.case.as_deref(),
            section: (!self.sections.is_empty()).then(|| self.sections.join("::")),
            message,
            result: outcome.map(|(label, _)| label),
            duration_ms: outcome.map(|(_, duration)| duration.as_secs_f64() * 1000.0),
        };
        let json = serde_json::to_string(&line).map_err(io::Error::other)?;
        self.sink.write_line("", &json, None)
    }

    pub fn info(&mut self, message: &str) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn error(&mut self, message: &str) {
        self.emit(LogLevel::Error, message, None);
    }

    /// `key: value` at info level
    pub fn field(&mut self, key: &str, value: &str) {
        self.info(&format!("{key}: {value}"));
    }

    /// Runs `f` with every line it writes indented under a `name:` header.
    pub fn section<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.info(&format!("{name}:"));
        self.sections.push(name.to_string());
        let result = f(self);
        self.sections.pop();
        result
    }

    /// The final `Result:` line; skips log at warn and failures at error.
    pub fn log_result(&mut self, result: &TestResult, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        let (level, message) = match result {
            TestResult::Pass => (LogLevel::Info, format!("Result: PASS ({ms:.3}ms)")),
            TestResult::Fail { reason } => (
                LogLevel::Error,
                format!("Result: FAIL ({ms:.3}ms) - {reason}"),
            ),
            TestResult::Skipped { reason } => (
                LogLevel::Warn,
                format!("Result: SKIP ({ms:.3}ms) - {reason}"),
            ),
        };
        self.emit(level, &message, Some((result.label(), duration)));
    }

    /// Report one finished case: its files, the errors each phase found and
    /// the final result.
    pub fn log_case(&mut self, ctx: &TestContext<'_>, result: &TestResult, duration: Duration) {
        let case = ctx.case();
        self.case = Some(case.id.clone());

        self.section("Files", |log| {
            log.field("Source", &case.paths.source.display().to_string());
            log.field("Golden", &case.paths.golden.display().to_string());
            if case.paths.reference.exists() {
                log.field("Reference", &case.paths.reference.display().to_string());
            }
        });

        if let Some(diagnostics) = ctx.diagnostics() {
            self.section("Diagnostics", |log| log.log_diagnostics(diagnostics));
        }

        self.log_result(result, duration);
        self.case = None;
    }

    fn log_diagnostics(&mut self, diagnostics: &CaseDiagnostics) {
        let phases = [
            ("HAS ANTLR LEXER ERRORS", &diagnostics.lexer_errors),
            ("HAS ANTLR PARSER ERRORS", &diagnostics.parser_errors),
        ];
        for (label, errors) in phases {
            self.field(label, yes_no(!errors.is_empty()));
            for error in errors {
                self.info(&format!("    - {error}"));
            }
        }

        if let Some(elements) = &diagnostics.reference_errors {
            self.field("HAS PSI ERROR ELEMENTS", yes_no(!elements.is_empty()));
            for element in elements {
                self.info(&format!("    - {element}"));
            }
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "YES" } else { "NO" }
}

/// A [`TestLogger`] shared by parallel cases
#[derive(Clone)]
pub struct SharedLogger {
    inner: Arc<Mutex<TestLogger>>,
}

impl SharedLogger {
    pub fn new(logger: TestLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Holds the logger so a whole case report stays contiguous
    pub fn lock(&self) -> MutexGuard<'_, TestLogger> {
        self.inner.lock()
    }

    pub fn error(&self, message: &str) {
        self.inner.lock().error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::traits::SkipReason;

    #[derive(Clone, Default)]
    struct Captured {
        bytes: Arc<Mutex<Vec<u8>>>,
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.bytes.lock().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn plain(out: &Captured) -> TestLogger {
        TestLogger::new()
            .with_output(out.clone())
            .with_timestamps(false)
    }

    #[test]
    fn test_sections_indent_fields() {
        let out = Captured::default();
        let mut logger = plain(&out);

        logger.section("Files", |log| log.field("Source", "a.kt"));
        logger.info("done");

        assert_eq!(
            out.text(),
            "[INFO] Files:\n[INFO]   Source: a.kt\n[INFO] done\n"
        );
    }

    #[test]
    fn test_timestamps_prefix_each_line() {
        let out = Captured::default();
        let mut logger = TestLogger::new().with_output(out.clone());

        logger.info("x");

        let text = out.text();
        assert!(text.starts_with('['));
        assert!(text.contains("ms] [INFO] x"));
    }

    #[test]
    fn test_level_filtering() {
        let out = Captured::default();
        let mut logger = plain(&out).with_level(LogLevel::Warn);

        logger.info("hidden");
        logger.log_result(&TestResult::Pass, Duration::from_millis(1));
        logger.log_result(
            &TestResult::Skipped {
                reason: SkipReason::Muted,
            },
            Duration::from_millis(1),
        );
        logger.error("shown");

        let text = out.text();
        assert!(!text.contains("hidden"));
        assert!(!text.contains("PASS"));
        assert!(text.contains("[WARN] Result: SKIP (1.000ms) - muted"));
        assert!(text.contains("[ERROR] shown"));
    }

    #[test]
    fn test_json_lines() {
        let out = Captured::default();
        let mut logger = plain(&out).with_format(OutputFormat::Json);

        logger.case = Some("psi$a.kt".to_string());
        logger.section("Diagnostics", |log| log.field("HAS ANTLR LEXER ERRORS", "NO"));
        logger.log_result(
            &TestResult::Skipped {
                reason: SkipReason::Muted,
            },
            Duration::from_millis(2),
        );

        let lines: Vec<serde_json::Value> = out
            .text()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["case"], "psi$a.kt");
        assert_eq!(lines[1]["section"], "Diagnostics");
        assert_eq!(lines[1]["message"], "HAS ANTLR LEXER ERRORS: NO");
        assert_eq!(lines[2]["level"], "WARN");
        assert_eq!(lines[2]["result"], "SKIP");
        let duration = lines[2]["duration_ms"].as_f64().unwrap();
        assert!((duration - 2.0).abs() < 1e-6);
        assert!(lines[0].get("elapsed_ms").is_none());
    }

    #[test]
    fn test_shared_logger_from_threads() {
        let out = Captured::default();
        let logger = SharedLogger::new(plain(&out));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        logger.error(&format!("case {i} line {j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(out.text().lines().count(), 100);
    }

    #[test]
    fn test_log_case_reports_diagnostics() {
        use crate::harness::config::{HarnessConfig, StaleHashPolicy};
        use crate::harness::fixtures::FixtureLoader;
        use grammar_tree::ParseSession;
        use grammar_tree::testing::KotlinSubsetEngine;
        use std::path::Path;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.kt"), "fun () {}").unwrap();
        let case = FixtureLoader::with_base_path(dir.path())
            .load_case(Path::new("broken.kt"))
            .unwrap();
        let config = HarnessConfig::new(StaleHashPolicy::Regenerate);
        let session = ParseSession::new(KotlinSubsetEngine::new);
        let mut ctx = TestContext::new(&config, case);
        let result = ctx.run(&session).unwrap();

        let out = Captured::default();
        let mut logger = plain(&out);
        logger.log_case(&ctx, &result, Duration::from_millis(1));

        let text = out.text();
        assert!(text.contains("[INFO] broken.kt Files:"));
        assert!(text.contains("HAS ANTLR LEXER ERRORS: NO"));
        assert!(text.contains("HAS ANTLR PARSER ERRORS: YES"));
        assert!(text.contains("- Line 1:5 missing Identifier at '('"));
        assert!(!text.contains("HAS PSI ERROR ELEMENTS"));
        assert!(text.contains("Result: SKIP"));
        assert!(logger.case.is_none());
    }
}
