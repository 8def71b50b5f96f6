//! Property-based tests for flag scanning and mode selection.

use proptest::prelude::*;

use lintel::flags::{InvocationContext, Mode, scan_flags};

/// Arguments that are never one of the launcher's own flags.
fn engine_arg() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z/._]{1,12}",
        "--[a-z-]{1,10}".prop_filter("not a launcher flag", |s| {
            s != "--stdin" && s != "--init" && s != "--debug"
        }),
        Just("--stdin-filename".to_string()),
        Just("--init-config".to_string()),
        Just("-".to_string()),
    ]
}

fn args_with(flags: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(engine_arg(), 0..8)
        .prop_flat_map(move |rest| {
            let mut all = rest;
            all.extend(flags.iter().map(|f| (*f).to_string()));
            Just(all).prop_shuffle()
        })
}

proptest! {
    #[test]
    fn stdin_found_anywhere(args in args_with(&["--stdin"])) {
        let ctx = InvocationContext::new(args);
        prop_assert!(ctx.flags().stdin);
        prop_assert_eq!(ctx.mode(), Mode::StdIn);
    }

    #[test]
    fn duplicates_do_not_matter(args in args_with(&["--stdin", "--stdin", "--debug", "--debug"])) {
        let f = scan_flags(&args);
        prop_assert!(f.stdin && f.debug && !f.init);
    }

    #[test]
    fn stdin_beats_init(args in args_with(&["--init", "--stdin"])) {
        prop_assert_eq!(InvocationContext::new(args).mode(), Mode::StdIn);
    }

    #[test]
    fn init_without_stdin(args in args_with(&["--init"])) {
        prop_assert_eq!(InvocationContext::new(args).mode(), Mode::Init);
    }

    #[test]
    fn normal_without_mode_flags(args in args_with(&["--debug"])) {
        let ctx = InvocationContext::new(args);
        prop_assert!(ctx.flags().debug);
        prop_assert_eq!(ctx.mode(), Mode::Normal);
    }

    #[test]
    fn scanning_is_idempotent(args in args_with(&["--init"])) {
        prop_assert_eq!(scan_flags(&args), scan_flags(&args));
    }

    #[test]
    fn order_does_not_matter(args in args_with(&["--debug", "--init"])) {
        let mut reversed = args.clone();
        reversed.reverse();
        prop_assert_eq!(scan_flags(&args), scan_flags(&reversed));
    }
}
