use tokio::signal::unix::{signal, SignalKind};

use crate::grading::TerminationFlag;

/// Set `termination` when SIGTERM or SIGINT arrives.
///
/// TAs observe the flag like any other end of run: they stop claiming new
/// questions and exit within one poll interval.
pub fn install_shutdown_handler(termination: TerminationFlag) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, stopping TAs");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, stopping TAs");
            }
            _ = termination.wait() => return,
        }

        termination.set();
    });

    Ok(())
}
