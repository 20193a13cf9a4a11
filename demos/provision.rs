use leeca_portal::{ControlPlane, LifecycleService, PortalSettings, ProvisioningService, ProxmoxResult};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// cargo run --example provision -- portal.toml silver alice
#[tokio::main]
async fn main() -> ProxmoxResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().unwrap_or_else(|| "portal.toml".to_string());
    let tier = args.next().unwrap_or_else(|| "bronze".to_string());
    let owner = args.next().unwrap_or_else(|| "demo".to_string());

    let settings = PortalSettings::from_file(&settings_path).await?;
    let client = Arc::new(settings.build_client()?);

    println!("Available tiers:");
    for size in settings.catalog().tiers() {
        println!(
            "  {:<8} {} ({} cores, {} MiB, {} GiB)",
            size.key, size.display_name, size.cores, size.memory_mb, size.disk_gb
        );
    }

    let provisioning = ProvisioningService::new(client.clone(), settings.catalog(), settings.placement());
    let outcome = provisioning.provision(&tier, &owner, 1).await;
    println!("{} [{}]: {}", if outcome.success { "OK" } else { "FAILED" }, outcome.state, outcome.message);

    let Some(id) = outcome.instance_id else {
        return Ok(());
    };
    let Some(size) = settings.catalog().get(&tier).cloned() else {
        return Ok(());
    };
    let target = leeca_portal::InstanceTarget::new(id, settings.placement().node, size.kind);
    println!("Power state: {}", client.read_power_state(&target).await);

    if outcome.left_partial_instance() {
        let lifecycle = LifecycleService::for_client(client).with_teardown_wait(settings.teardown_wait_seconds());
        let cleanup = lifecycle.teardown(&target).await;
        println!("Cleanup: {}", cleanup.message);
    }

    Ok(())
}
