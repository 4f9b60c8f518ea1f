use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use log::{debug, info};

use super::RaceDataSource;
use crate::{
    LaptraceError,
    state::{FetchRequest, FetchResponse},
};

/// Handle to the background thread that runs fetch requests one at a time.
///
/// The UI thread never blocks on it: requests go in through [`FetchWorker::submit`]
/// and finished responses are drained with [`FetchWorker::poll`]. Dropping the
/// handle closes the request channel, which ends the thread once its current
/// request returns.
pub struct FetchWorker {
    request_tx: Sender<FetchRequest>,
    response_rx: Receiver<FetchResponse>,
}

impl FetchWorker {
    pub fn spawn<S>(source: S) -> Self
    where
        S: RaceDataSource + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (response_tx, response_rx) = mpsc::channel::<FetchResponse>();
        thread::spawn(move || run_requests(source, request_rx, response_tx));
        Self {
            request_tx,
            response_rx,
        }
    }

    pub fn submit(&self, requests: Vec<FetchRequest>) -> Result<(), LaptraceError> {
        for request in requests {
            self.request_tx
                .send(request)
                .map_err(|_| LaptraceError::WorkerDisconnected)?;
        }
        Ok(())
    }

    /// Responses that finished since the last call
    pub fn poll(&self) -> Vec<FetchResponse> {
        self.response_rx.try_iter().collect()
    }
}

fn run_requests(
    source: impl RaceDataSource,
    request_rx: Receiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
) {
    info!("Fetch worker started");
    for request in request_rx {
        debug!("Fetching {:?}", request.kind);
        if response_tx.send(request.execute(&source)).is_err() {
            break;
        }
    }
    info!("Fetch worker stopped");
}
