//! `srm-bridge run`: start the controller and run until interrupted.

use std::sync::Arc;

use tokio_stream::StreamExt;
use tracing::{info, warn};

use srm_core::{Controller, SrmConnector, StateTree, Subscription, is_valid_ipv4};

use crate::cli::{GlobalOpts, RunArgs};
use crate::commands::console;
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge = config::build_bridge_config(global)?;
    if !is_valid_ipv4(&bridge.host) {
        return Err(CliError::Validation {
            field: "router.host".into(),
            reason: format!("{:?} is not a valid IPv4 address", bridge.host),
        });
    }

    let store = Arc::new(StateTree::new());
    let controller = Controller::spawn(bridge, SrmConnector, Arc::clone(&store));

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(log_state_changes(controller.clone())));
    if let Some(ref pattern) = args.watch {
        let color = output::should_color(global.color);
        tasks.push(tokio::spawn(print_changes(store.subscribe(pattern), color)));
    }

    if args.console {
        tokio::select! {
            () = shutdown_signal() => {}
            () = console::serve(Arc::clone(&store)) => info!("console quit"),
        }
    } else {
        shutdown_signal().await;
    }

    info!("shutting down");
    controller.shutdown().await;
    for task in tasks {
        task.abort();
    }
    Ok(())
}

async fn log_state_changes(controller: Controller) {
    let mut state = controller.subscribe_state();
    while state.changed().await.is_ok() {
        let current = *state.borrow_and_update();
        info!(state = %current, "controller state");
    }
}

async fn print_changes(subscription: Subscription, color: bool) {
    let mut changes = subscription.into_stream();
    while let Some(change) = changes.next().await {
        println!("{}", output::change_line(&change.path, &change.state, color));
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
