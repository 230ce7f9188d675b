// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Callback list options

use std::fmt;

bitflags::bitflags! {
    /// Firing policy of a `CallbackList`, fixed at construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u8 {
        /// The list can only be fired once; it locks itself when dispatch starts.
        const ONCE          = 0b0000_0001;
        /// Keep the last argument and replay it to callbacks added after firing.
        const MEMORY        = 0b0000_0010;
        /// Stop the current dispatch when a callback returns `false`.
        const STOP_ON_FALSE = 0b0000_0100;
    }
}

impl Options {
    /// Options of the success and failure lists of a `Future`
    pub const SETTLEMENT: Options = Options::ONCE.union(Options::MEMORY);
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Options, &str); 3] = [
            (Options::ONCE, "once"),
            (Options::MEMORY, "memory"),
            (Options::STOP_ON_FALSE, "stop_on_false"),
        ];

        f.write_str("[")?;
        let mut first = true;
        for &(flag, name) in NAMES.iter() {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Options::empty().to_string(), "[]");
        assert_eq!(Options::SETTLEMENT.to_string(), "[once|memory]");
        assert_eq!(Options::all().to_string(), "[once|memory|stop_on_false]");
    }
}
