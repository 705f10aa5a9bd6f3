//! Racing a host suspension against cancellation.

use super::policy::ResumePolicy;
use lull_core::error::Result;
use lull_core::suspension::SuspensionOutcome;
use lull_core::traits::ExecutionHost;

/// Hand `policy` to the host and wait for whichever comes first: the host
/// resuming the execution, or the cancellation signal.
///
/// Cancellation is subscribed before the wait is issued, so a cancel fired
/// while the host is still accepting the request is not missed. When both are
/// ready at once, cancellation wins. The losing side is dropped and has no
/// further effect.
///
/// A host failure is returned as an error, unless cancellation already won.
pub async fn suspend(host: &dyn ExecutionHost, policy: &ResumePolicy) -> Result<SuspensionOutcome> {
    let canceled = host.cancellation().subscribe();
    let resumed = host.put_execution_to_wait(policy.wait_until());

    tokio::select! {
        biased;

        () = canceled => {
            tracing::debug!(trace_id = %host.trace_id(), "Cancellation won the race");
            Ok(SuspensionOutcome::Canceled)
        }
        result = resumed => {
            result?;
            Ok(SuspensionOutcome::Resumed)
        }
    }
}
