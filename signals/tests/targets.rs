mod common;
use common::{Foo, Recorder};
use signal_slots::*;
use std::cell::RefCell;
use std::sync::mpsc;

/// A function object, like a hand-written functor
struct ActionFunctor<'a> {
    log: &'a Recorder,
}

impl Invocable<&str, ()> for ActionFunctor<'_> {
    fn invoke(&self, message: &str) { self.log.record(format!("functor: {message}")) }
}

struct Account {
    balance: i64,
}

impl Account {
    fn deposit(&mut self, amount: i64) -> i64 {
        self.balance += amount;
        self.balance
    }

    fn withdraw(&mut self, amount: i64) -> i64 {
        self.balance -= amount;
        self.balance
    }

    // calls back into an account while this one is mutably borrowed
    fn relay(&mut self, inner: Connection<'_, i64, i64>) -> Result<i64, SignalError> {
        self.balance += 1;
        inner.invoke(1)
    }
}

/// Forwards every value to a channel, shifted by `offset`
#[repr(C)]
struct Relay {
    tx: mpsc::Sender<u32>,
    offset: u32,
}

impl Invocable<u32, ()> for Relay {
    fn invoke(&self, value: u32) { let _ = self.tx.send(value + self.offset); }
}

#[derive(Clone, Debug, PartialEq)]
struct Payload {
    id: u32,
    tags: Vec<String>,
}

#[test]
fn test_every_target_kind_together() {
    let foo = Foo::new("foo");
    let log = Recorder::new();

    let closure = |message: &str| log.record(format!("closure: {message}"));
    // bound with a fixed argument, ignoring the emitted one
    let bound = |_: &str| foo.print_string("bound string");
    let boxed: Box<dyn Fn(&str) + '_> = Box::new(|message: &str| log.record(format!("boxed: {message}")));
    let functor = ActionFunctor { log: &log };

    let mut signal: Signal<&str> = Signal::new();
    let connections = [
        signal.connect(&closure),
        signal.connect(&bound),
        signal.connect(&boxed),
        signal.connect(&functor),
        signal.connect_method(&foo, Foo::print_string),
    ];
    assert_eq!(signal.count(), 5);
    assert_eq!(
        connections.iter().map(|connection| connection.kind().unwrap()).collect::<Vec<_>>(),
        [TargetKind::Invocable, TargetKind::Invocable, TargetKind::Invocable, TargetKind::Invocable, TargetKind::Method]
    );

    signal.emit("Hello world!").unwrap();
    assert_eq!(log.check(), ["closure: Hello world!", "boxed: Hello world!", "functor: Hello world!"]);
    assert_eq!(foo.log.check(), ["foo member: bound string", "foo member: Hello world!"]);

    assert!(signal.disconnect(&closure));
    assert!(signal.disconnect(&bound));
    assert!(signal.disconnect(&boxed));
    assert!(signal.disconnect(&functor));
    assert!(signal.disconnect_method(&foo, Foo::print_string));
    assert!(signal.is_empty());
}

#[test]
fn test_target_sharing_an_address_with_its_field() {
    let (tx, rx) = mpsc::channel();
    let relay = Relay { tx, offset: 100 };
    // the relay and its first field live at the same address
    assert!(std::ptr::eq((&relay as *const Relay).cast::<()>(), (&relay.tx as *const mpsc::Sender<u32>).cast::<()>()));

    let mut signal: Signal<u32> = Signal::new();
    let connection = signal.connect(&relay);
    assert!(connection.targets(&relay));
    assert!(!connection.targets(&relay.tx));

    // never connected: no-op
    assert!(!signal.disconnect(&relay.tx));
    assert_eq!(signal.count(), 1);

    signal.emit(1).unwrap();
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), [101]);

    assert!(signal.disconnect(&relay));
    assert!(signal.is_empty());
}

#[test]
fn test_method_identity_is_instance_and_method() {
    let foo = Foo::new("foo");
    let bar = Foo::new("bar");
    let mut signal: Signal<&str> = Signal::new();
    signal.connect_method(&foo, Foo::print_string);
    signal.connect_method(&bar, Foo::print_string);

    // same method, other instance
    assert!(signal.disconnect_method(&bar, Foo::print_string));
    assert_eq!(signal.count(), 1);

    signal.emit("left").unwrap();
    assert_eq!(foo.log.check(), ["foo member: left"]);
    assert_eq!(bar.log.check(), [] as [&str; 0]);
}

#[test]
fn test_mutating_methods() {
    let account = RefCell::new(Account { balance: 100 });
    let mut signal: Signal<i64, i64> = Signal::new();
    signal.connect_method_mut(&account, Account::deposit);
    signal.connect_method_mut(&account, Account::withdraw);

    assert_eq!(signal.collect(10), Ok(vec![110, 100]));

    assert!(signal.disconnect_method_mut(&account, Account::deposit));
    assert_eq!(signal.count(), 1);
    assert!(!signal.disconnect_method_mut(&account, Account::deposit));

    assert_eq!(signal.collect(30), Ok(vec![70]));
    assert_eq!(account.borrow().balance, 70);
}

#[test]
fn test_reentrant_call_reports_busy_target() {
    let account = RefCell::new(Account { balance: 0 });
    let other = RefCell::new(Account { balance: 0 });

    let mut inner: Signal<i64, i64> = Signal::new();
    let same_account = inner.connect_method_mut(&account, Account::deposit);
    let other_account = inner.connect_method_mut(&other, Account::deposit);

    let mut outer: Signal<Connection<'_, i64, i64>, Result<i64, SignalError>> = Signal::new();
    outer.connect_method_mut(&account, Account::relay);

    assert_eq!(outer.collect(same_account), Ok(vec![Err(SignalError::TargetBusy)]));
    assert_eq!(outer.collect(other_account), Ok(vec![Ok(1)]));
    assert_eq!(account.borrow().balance, 2);
    assert_eq!(other.borrow().balance, 1);
}

#[test]
fn test_tuple_arguments() {
    let foo = Foo::new("foo");
    let mut signal: Signal<(&str, bool)> = Signal::new();
    signal.connect_method(&foo, Foo::print_string_flagged);

    signal.emit(("is it", true)).unwrap();
    assert_eq!(foo.log.check(), ["foo member: is it? true"]);
}

#[test]
fn test_owned_arguments_are_cloned_per_target() {
    let received = RefCell::new(Vec::new());
    let keep = |payload: Payload| received.borrow_mut().push(payload);
    let count_tags = |payload: Payload| payload.tags.len();

    let mut consumers: Signal<Payload> = Signal::new();
    consumers.connect(&keep);
    consumers.connect(&keep);

    let payload = Payload { id: 1, tags: vec!["a".into(), "b".into()] };
    consumers.emit(payload.clone()).unwrap();
    assert_eq!(*received.borrow(), vec![payload.clone(), payload.clone()]);

    let mut counters: Signal<Payload, usize> = Signal::new();
    counters.connect(&count_tags);
    assert_eq!(counters.collect(payload), Ok(vec![2]));
}
