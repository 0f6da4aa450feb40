/*!
Typed signal/slot connections.

A [`Signal<'a, A, R>`](Signal) holds an ordered list of [`Connection`]s to targets that take an `A`
and return an `R`. Emitting the signal calls every target in the order it was connected.

# Design requirements:
- Targets of every kind share one handle type: free and associated functions, `&self` methods,
  `&mut self` methods (through a `RefCell`), and any [`Invocable`] held by reference.
- Connections never own or allocate for their target. The `'a` lifetime keeps every target
  borrowed for as long as a signal or connection can reach it.
- Connections are `Copy` values. Keep one around to disconnect later.
- Disconnecting matches on target identity (instance, function address and type), not on a
  registration id, so the same target can be disconnected without the handle.
- Misuse is an error value, not undefined behaviour: see [`SignalError`].
- Single-threaded. Mutating a signal takes `&mut self`, so targets cannot disconnect
  themselves in the middle of an emission.

# Basic usage

```rust
use signal_slots::*;

struct Console {
    prefix: &'static str,
}

impl Console {
    fn print(&self, message: &str) { println!("{}{}", self.prefix, message) }
}

fn shout(message: &str) { println!("{}!", message.to_uppercase()) }

let console = Console { prefix: "> " };
let mut signal: Signal<&str> = Signal::new();
signal.connect_fn(shout);
signal.connect_method(&console, Console::print);
assert_eq!(signal.count(), 2);

// Should print:
// HI!
// > hi
assert_eq!(signal.emit("hi"), Ok(2));

signal.disconnect_fn(shout);
assert_eq!(signal.count(), 1);
```

# Collecting results

```rust
use signal_slots::*;

let yes = |_: ()| true;
let no = |_: ()| false;
let mut signal: Signal<(), bool> = Signal::new();
signal.connect(&no);
signal.connect(&no);
signal.connect(&yes);

let mut results = [true; 3];
signal.emit_collect(&mut results, ()).unwrap();
assert_eq!(results, [false, false, true]);
assert_eq!(signal.collect(()).unwrap(), vec![false, false, true]);
```
*/

mod connection;
mod error;
mod signal;
mod traits;

pub use connection::*;
pub use error::*;
pub use signal::*;
pub use traits::*;
