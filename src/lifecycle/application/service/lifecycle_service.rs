use crate::{
    ProxmoxClient,
    core::{
        domain::{
            control_plane::ControlPlane,
            error::ProxmoxResult,
            model::{
                instance::{InstanceTarget, PowerState},
                outcome::OperationOutcome,
            },
        },
        infrastructure::client_config::ClientConfig,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default number of polls spent waiting for an instance to stop before deleting it.
pub const DEFAULT_TEARDOWN_WAIT_SECONDS: u32 = 20;

/// Stops `target` if it is running, waits up to `wait_seconds` polls for it to
/// go down, then deletes it whatever state it ended in.
///
/// The stop result is ignored and the wait is bounded, so teardown always
/// finishes: at worst after one status read, one stop, `wait_seconds` polls
/// and one delete.
///
/// # Errors
/// Returns the delete call's error; nothing before it can fail the teardown.
#[instrument(skip(plane, target, poll_interval), fields(instance = %target))]
pub async fn ensure_stopped_then_delete<C>(
    plane: &C,
    target: &InstanceTarget,
    wait_seconds: u32,
    poll_interval: Duration,
) -> ProxmoxResult<()>
where
    C: ControlPlane + ?Sized,
{
    if plane.read_power_state(target).await == PowerState::Running {
        if let Err(e) = plane.stop(target).await {
            warn!(error = %e, "stop request failed, deleting anyway");
        }

        let mut stopped = false;
        for _ in 0..wait_seconds {
            if plane.read_power_state(target).await != PowerState::Running {
                stopped = true;
                break;
            }
            tokio::time::sleep(poll_interval).await;
        }
        if !stopped {
            warn!(wait_seconds, "instance still running after wait budget, forcing delete");
        }
    }

    plane.delete(target).await?;
    info!("instance deleted");
    Ok(())
}

/// Power control and teardown for instances the portal already provisioned.
pub struct LifecycleService<C: ControlPlane + ?Sized> {
    plane: Arc<C>,
    teardown_wait_seconds: u32,
    poll_interval: Duration,
}

impl<C: ControlPlane + ?Sized> LifecycleService<C> {
    pub fn new(plane: Arc<C>) -> Self {
        Self {
            plane,
            teardown_wait_seconds: DEFAULT_TEARDOWN_WAIT_SECONDS,
            poll_interval: ClientConfig::default().status_poll_interval,
        }
    }

    pub fn with_teardown_wait(mut self, seconds: u32) -> Self {
        self.teardown_wait_seconds = seconds;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Current power state; `Unknown` when it cannot be read.
    pub async fn get_power_state(&self, target: &InstanceTarget) -> PowerState {
        self.plane.read_power_state(target).await
    }

    #[instrument(skip(self, target), fields(instance = %target))]
    pub async fn start(&self, target: &InstanceTarget) -> OperationOutcome {
        match self.plane.start(target).await {
            Ok(()) => {
                info!("start requested");
                OperationOutcome::succeeded(format!(
                    "{} {} started",
                    target.kind.label(),
                    target.id
                ))
            }
            Err(e) => {
                warn!(error = %e, "start failed");
                OperationOutcome::failed(&e)
            }
        }
    }

    /// Stops the instance and reports the power state observed right after.
    #[instrument(skip(self, target), fields(instance = %target))]
    pub async fn stop(&self, target: &InstanceTarget) -> OperationOutcome {
        match self.plane.stop(target).await {
            Ok(()) => {
                let state = self.plane.read_power_state(target).await;
                info!(%state, "stop requested");
                OperationOutcome::succeeded(format!(
                    "{} {} stop requested, power state is now {}",
                    target.kind.label(),
                    target.id,
                    state
                ))
            }
            Err(e) => {
                warn!(error = %e, "stop failed");
                OperationOutcome::failed(&e)
            }
        }
    }

    /// Stop-then-delete with the configured wait budget.
    pub async fn teardown(&self, target: &InstanceTarget) -> OperationOutcome {
        self.ensure_stopped_then_delete(target, self.teardown_wait_seconds)
            .await
    }

    pub async fn ensure_stopped_then_delete(
        &self,
        target: &InstanceTarget,
        wait_seconds: u32,
    ) -> OperationOutcome {
        match ensure_stopped_then_delete(
            self.plane.as_ref(),
            target,
            wait_seconds,
            self.poll_interval,
        )
        .await
        {
            Ok(()) => OperationOutcome::succeeded(format!(
                "{} {} deleted",
                target.kind.label(),
                target.id
            )),
            Err(e) => {
                warn!(instance = %target, error = %e, "teardown failed");
                OperationOutcome::failed(&e)
            }
        }
    }
}

impl LifecycleService<ProxmoxClient> {
    /// Lifecycle control over `client`, polling at its configured status interval.
    pub fn for_client(client: Arc<ProxmoxClient>) -> Self {
        let poll_interval = client.config().status_poll_interval;
        Self::new(client).with_poll_interval(poll_interval)
    }
}
