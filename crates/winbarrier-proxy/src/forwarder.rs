//! Forwards parsed remote commands to the host.

use tracing::debug;
use winbarrier_common::BarrierError;

use crate::barrier::WindowsBarrier;
use crate::command::RemoteCommand;
use crate::host::WindowHost;
use crate::sanitize::sanitize_create;

/// Execute one command against the host on behalf of `barrier`'s connection.
///
/// A create's direct reply only surfaces errors; the remote side learns of
/// the window through the created event. A host failure is returned as is
/// and nothing is posted.
pub async fn forward(
    host: &dyn WindowHost,
    barrier: &mut WindowsBarrier,
    command: RemoteCommand,
) -> Result<(), BarrierError> {
    match command {
        RemoteCommand::Create(request) => {
            let clean = sanitize_create(&request);
            match host.create_window(clean).await? {
                Some(id) => barrier.expect_created(id),
                None => debug!(connection = %barrier.name(), "host created an untrackable window"),
            }
        }
        RemoteCommand::GetAll(filter) => {
            let windows = host.get_all(filter).await?;
            barrier.on_get_all(windows);
        }
    }
    Ok(())
}
