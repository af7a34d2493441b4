//! worker.rs
//! Bucle principal: procesa la cola, duerme, repite. Solo sale si se cancela el token.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::services::dispatch_service::DispatchService;

pub async fn run_worker(dispatcher: DispatchService, interval: Duration, token: CancellationToken) {
    log::info!("(run_worker) Worker iniciado, intervalo={:?}", interval);
    loop {
        run_cycle(&dispatcher).await;

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    log::info!("(run_worker) Worker detenido");
}

/// Una vuelta del bucle; cualquier error se loguea y no sale de aquí.
pub async fn run_cycle(dispatcher: &DispatchService) {
    if let Err(e) = dispatcher.process_queue().await {
        log::error!("(run_worker) Error en el ciclo: {:#}", e);
    }
}
