use crate::config::LauncherConfig;
use crate::delegate::Installed;
use crate::diagnostics;
use crate::failure::{self, FailureReporter};
use crate::flags::InvocationContext;

mod dispatch;

pub use dispatch::{dispatch, report_init_failure};

/// Runs the launcher and returns the process exit status.
///
/// The failure boundary is armed before the arguments are even looked at;
/// diagnostics come on before anything that logs is constructed.
pub fn run() -> i32 {
    let reporter = FailureReporter::installed();
    failure::guard(&reporter, |status| {
        let ctx = InvocationContext::from_env();
        diagnostics::activate(ctx.flags().debug);
        let config = LauncherConfig::resolve()?;
        dispatch(&ctx, &Installed::new(config), status)
    })
}
