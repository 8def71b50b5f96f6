use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::delegate::Collaborators;
use crate::failure::StatusSlot;
use crate::flags::{InvocationContext, Mode};

pub const INIT_FAILURE_STATUS: i32 = 1;

/// Runs exactly one invocation mode and records its exit status.
///
/// Wizard failures are reported here and end in status 1. Everything else
/// that goes wrong is returned for the failure boundary.
///
/// # Errors
/// Returns an error if piped input cannot be read or the engine cannot be
/// run to completion.
pub fn dispatch(
    ctx: &InvocationContext,
    collaborators: &dyn Collaborators,
    status: &mut StatusSlot,
) -> Result<()> {
    let mode = ctx.mode();
    tracing::debug!(target: "lintel::cli", ?mode, args = ctx.forwarded_args().len(), "dispatching");

    match mode {
        Mode::StdIn => {
            let engine = collaborators.engine()?;
            let text = collaborators.read_input()?;
            status.set(engine.execute(ctx, Some(text.as_str()))?);
        }
        Mode::Init => {
            let initializer = collaborators.initializer()?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("start runtime for configuration wizard")?;
            match runtime.block_on(initializer.initialize()) {
                Ok(()) => status.set(0),
                Err(err) => {
                    status.set(INIT_FAILURE_STATUS);
                    // stderr closed: the status still says it failed
                    let _ = report_init_failure(&err, &mut io::stderr().lock());
                }
            }
        }
        Mode::Normal => {
            let engine = collaborators.engine()?;
            status.set(engine.execute(ctx, None)?);
        }
    }
    Ok(())
}

/// Message first, then the full trace.
///
/// # Errors
/// Returns an error if writing to `out` fails.
pub fn report_init_failure<W: Write>(err: &anyhow::Error, out: &mut W) -> io::Result<()> {
    writeln!(out, "{err}")?;
    writeln!(out, "{err:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use anyhow::{anyhow, bail};
    use async_trait::async_trait;

    use crate::delegate::{ConfigInitializer, LintEngine};

    #[derive(Default)]
    struct Fake {
        engine_status: i32,
        wizard_fails: bool,
        engine_fails: bool,
        reads: Cell<usize>,
        engines: Cell<usize>,
        wizards: Cell<usize>,
        piped: RefCell<Vec<Option<String>>>,
    }

    struct FakeEngine<'a>(&'a Fake);

    impl LintEngine for FakeEngine<'_> {
        fn execute(&self, _ctx: &InvocationContext, piped: Option<&str>) -> Result<i32> {
            self.0.piped.borrow_mut().push(piped.map(str::to_string));
            if self.0.engine_fails {
                bail!("engine exploded");
            }
            Ok(self.0.engine_status)
        }
    }

    struct FakeWizard(bool);

    #[async_trait]
    impl ConfigInitializer for FakeWizard {
        async fn initialize(&self) -> Result<()> {
            tokio::task::yield_now().await;
            if self.0 {
                Err(anyhow!("wizard cancelled"))
            } else {
                Ok(())
            }
        }
    }

    impl Collaborators for Fake {
        fn read_input(&self) -> Result<String> {
            self.reads.set(self.reads.get() + 1);
            Ok("const a = 1;\n".to_string())
        }

        fn engine(&self) -> Result<Box<dyn LintEngine + '_>> {
            self.engines.set(self.engines.get() + 1);
            Ok(Box::new(FakeEngine(self)))
        }

        fn initializer(&self) -> Result<Box<dyn ConfigInitializer + '_>> {
            self.wizards.set(self.wizards.get() + 1);
            Ok(Box::new(FakeWizard(self.wizard_fails)))
        }
    }

    fn ctx(args: &[&str]) -> InvocationContext {
        InvocationContext::new(args.iter().map(|s| (*s).to_string()).collect())
    }

    fn run(fake: &Fake, args: &[&str]) -> Result<i32> {
        let mut status = StatusSlot::default();
        dispatch(&ctx(args), fake, &mut status)?;
        Ok(status.code())
    }

    #[test]
    fn stdin_mode_reads_once_and_pipes_text() {
        let fake = Fake {
            engine_status: 1,
            ..Fake::default()
        };
        assert_eq!(run(&fake, &["lintel", "--stdin", "--stdin"]).unwrap(), 1);
        assert_eq!(fake.reads.get(), 1);
        assert_eq!(
            *fake.piped.borrow(),
            vec![Some("const a = 1;\n".to_string())]
        );
        assert_eq!(fake.wizards.get(), 0);
    }

    #[test]
    fn stdin_beats_init() {
        let fake = Fake::default();
        assert_eq!(run(&fake, &["lintel", "--init", "--stdin"]).unwrap(), 0);
        assert_eq!(fake.reads.get(), 1);
        assert_eq!(fake.wizards.get(), 0);
    }

    #[test]
    fn normal_mode_passes_engine_status_through() {
        let fake = Fake {
            engine_status: 42,
            ..Fake::default()
        };
        assert_eq!(run(&fake, &["lintel", "src", "--debug"]).unwrap(), 42);
        assert_eq!(fake.reads.get(), 0);
        assert_eq!(*fake.piped.borrow(), vec![None]);
    }

    #[test]
    fn init_success_is_zero() {
        let fake = Fake {
            engine_status: 9,
            ..Fake::default()
        };
        assert_eq!(run(&fake, &["lintel", "--init"]).unwrap(), 0);
        assert_eq!(fake.wizards.get(), 1);
        assert_eq!(fake.engines.get(), 0);
    }

    #[test]
    fn init_failure_is_handled_locally() {
        let fake = Fake {
            wizard_fails: true,
            ..Fake::default()
        };
        assert_eq!(run(&fake, &["lintel", "--init"]).unwrap(), INIT_FAILURE_STATUS);
    }

    #[test]
    fn engine_errors_escape_to_the_boundary() {
        let fake = Fake {
            engine_fails: true,
            ..Fake::default()
        };
        let err = run(&fake, &["lintel"]).unwrap_err();
        assert_eq!(err.to_string(), "engine exploded");
    }

    #[test]
    fn init_failure_report_has_message_then_trace() {
        let err = anyhow!("no config written").context("configuration wizard failed");
        let mut out = Vec::new();
        report_init_failure(&err, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        let mut lines = s.lines();
        assert_eq!(lines.next(), Some("configuration wizard failed"));
        assert!(s.contains("Caused by:"));
        assert!(s.contains("no config written"));
    }
}
