use std::cell::RefCell;
use std::str::FromStr;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).with_test_writer().try_init();
}

/// Accumulates the calls made by connected targets so a test can check them in order
#[allow(unused)]
#[derive(Default)]
pub struct Recorder(RefCell<Vec<String>>);

#[allow(unused)]
impl Recorder {
    pub fn new() -> Self { Self::default() }

    pub fn record(&self, entry: impl Into<String>) { self.0.borrow_mut().push(entry.into()) }

    /// Returns everything recorded since the last check
    pub fn check(&self) -> Vec<String> { self.0.borrow_mut().drain(..).collect() }
}

#[allow(unused)]
pub struct Foo {
    pub name: &'static str,
    pub log: Recorder,
}

#[allow(unused)]
impl Foo {
    pub fn new(name: &'static str) -> Self { Self { name, log: Recorder::new() } }

    pub fn print_string(&self, message: &str) { self.log.record(format!("{} member: {message}", self.name)) }

    pub fn print_string_flagged(&self, (message, flag): (&str, bool)) { self.log.record(format!("{} member: {message}? {flag}", self.name)) }

    pub fn returns_true(&self, _: ()) -> bool { true }

    pub fn static_returns_false(_: ()) -> bool { false }
}
