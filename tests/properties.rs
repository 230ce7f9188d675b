extern crate deferro;
extern crate proptest;

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use deferro::{when, CallbackList, Future, Options};

fn options() -> impl Strategy<Value = Options> {
    (0u8..8).prop_map(Options::from_bits_truncate)
}

proptest! {
    #[test]
    fn once_lists_deliver_at_most_one_argument(opts in options(), args in prop::collection::vec(any::<i32>(), 1..10)) {
        let list = CallbackList::<i32>::new(opts | Options::ONCE);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        list.add(move |x: &i32| s.lock().unwrap().push(*x));
        for arg in &args {
            list.fire(*arg);
        }

        prop_assert_eq!(seen.lock().unwrap().clone(), vec![args[0]]);
        prop_assert!(list.is_locked());
    }

    #[test]
    fn memory_replays_latest_argument_to_late_subscriber(args in prop::collection::vec(any::<i32>(), 1..10)) {
        let list = CallbackList::<i32>::new(Options::MEMORY);
        let early = Arc::new(Mutex::new(Vec::new()));
        let late = Arc::new(Mutex::new(Vec::new()));

        let e = early.clone();
        list.add(move |x: &i32| e.lock().unwrap().push(*x));
        for arg in &args {
            list.fire(*arg);
        }
        let l = late.clone();
        list.add(move |x: &i32| l.lock().unwrap().push(*x));

        prop_assert_eq!(early.lock().unwrap().clone(), args.clone());
        prop_assert_eq!(late.lock().unwrap().clone(), vec![args[args.len() - 1]]);
    }

    #[test]
    fn when_preserves_input_order(values in prop::collection::vec(any::<u16>(), 0..12),
                                  seed in any::<u64>()) {
        let pairs: Vec<_> = values.iter().map(|_| deferro::make::<u16, String>()).collect();
        let joined = when(pairs.iter().map(|&(_, ref f)| f.clone()).collect::<Vec<Future<u16, String>>>());

        // Settle in a scrambled order
        let mut order: Vec<usize> = (0..values.len()).collect();
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            order.swap(i, (state >> 33) as usize % (i + 1));
        }
        for i in order {
            pairs[i].0.resolve(values[i]);
        }

        let expected: Vec<Option<u16>> = values.iter().cloned().map(Some).collect();
        prop_assert_eq!(joined.result(), Some(Ok(expected)));
    }
}
