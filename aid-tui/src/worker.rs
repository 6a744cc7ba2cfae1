//! Background fetch worker. Every provider call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The main
//! thread drains responses once per tick and hands completions to the
//! details session that issued them.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use aid_core::details::{execute, FetchCompletion, FetchRequest};
use aid_core::domain::Page;
use aid_core::provider::MarketProvider;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    LoadCompanies,
    Fetch(FetchRequest),
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Companies(Vec<Page>),
    Completed(FetchCompletion),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    provider: Arc<dyn MarketProvider>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("aid-worker".into())
        .spawn(move || worker_loop(rx, tx, provider))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>, provider: Arc<dyn MarketProvider>) {
    info!(provider = provider.name(), "fetch worker started");
    loop {
        let response = match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::LoadCompanies) => WorkerResponse::Companies(provider.companies()),
            Ok(WorkerCommand::Fetch(request)) => {
                debug!(session = %request.session(), "running fetch");
                WorkerResponse::Completed(execute(provider.as_ref(), request))
            }
        };
        // UI gone: nothing left to deliver to.
        if tx.send(response).is_err() {
            break;
        }
    }
    info!("fetch worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use aid_core::details::DetailsSession;
    use aid_core::provider::SyntheticProvider;

    fn spawn() -> (Sender<WorkerCommand>, Receiver<WorkerResponse>, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let provider: Arc<dyn MarketProvider> = Arc::new(SyntheticProvider::new(3));
        let handle = spawn_worker(cmd_rx, resp_tx, provider).unwrap();
        (cmd_tx, resp_rx, handle)
    }

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, _resp_rx, handle) = spawn();
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn worker_loads_companies() {
        let (cmd_tx, resp_rx, handle) = spawn();
        cmd_tx.send(WorkerCommand::LoadCompanies).unwrap();
        match resp_rx.recv().unwrap() {
            WorkerResponse::Companies(pages) => assert!(!pages.is_empty()),
            other => panic!("expected companies, got {other:?}"),
        }
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn worker_completes_session_fetch() {
        let (cmd_tx, resp_rx, handle) = spawn();
        let mut session = DetailsSession::new("SBER");
        cmd_tx.send(WorkerCommand::Fetch(session.load_chart().unwrap())).unwrap();
        match resp_rx.recv().unwrap() {
            WorkerResponse::Completed(completion) => assert!(session.apply(completion)),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(!session.chart_points().is_empty());
        drop(cmd_tx);
        handle.join().unwrap();
    }
}
