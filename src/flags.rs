//! Invocation flags and mode selection.
//!
//! The launcher owns exactly three presence-only flags. Everything else on
//! the command line belongs to the linting engine and is passed through
//! untouched, so no argument parser is involved: a flag counts if it
//! appears anywhere in the sequence.

pub const STDIN_FLAG: &str = "--stdin";
pub const INIT_FLAG: &str = "--init";
pub const DEBUG_FLAG: &str = "--debug";

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub stdin: bool,
    pub init: bool,
    pub debug: bool,
}

pub fn scan_flags<S: AsRef<str>>(args: &[S]) -> Flags {
    let has = |flag: &str| args.iter().any(|a| a.as_ref() == flag);
    Flags {
        stdin: has(STDIN_FLAG),
        init: has(INIT_FLAG),
        debug: has(DEBUG_FLAG),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    StdIn,
    Init,
    Normal,
}

impl Mode {
    /// First match wins: `--stdin` beats `--init`, which beats a plain run.
    pub fn select(flags: Flags) -> Mode {
        if flags.stdin {
            Mode::StdIn
        } else if flags.init {
            Mode::Init
        } else {
            Mode::Normal
        }
    }
}

/// The raw argument sequence (program name first) and the flags derived
/// from it. Built once at start-up and only read afterwards.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    args: Vec<String>,
    flags: Flags,
}

impl InvocationContext {
    pub fn new(args: Vec<String>) -> Self {
        let flags = scan_flags(&args);
        InvocationContext { args, flags }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
        )
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments after the program name, in their original order.
    pub fn forwarded_args(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn mode(&self) -> Mode {
        Mode::select(self.flags)
    }
}
