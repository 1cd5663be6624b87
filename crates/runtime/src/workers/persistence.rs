//! Persistence worker for the action log.
//!
//! Subscribes to the combat topic and appends one [`ActionRecord`] per
//! resolved action. Storage failures are logged and never stop a battle.

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::repository::{ActionLogRepository, ActionRecord, RepositoryError};

/// Commands that can be sent to the persistence worker
pub(crate) enum PersistenceCommand {
    /// Flushes the log once every event already received is written.
    Flush {
        reply: oneshot::Sender<Result<u64, RepositoryError>>,
    },
    Shutdown,
}

pub(crate) struct PersistenceWorker {
    log: Box<dyn ActionLogRepository>,
    event_rx: broadcast::Receiver<Event>,
    command_rx: mpsc::Receiver<PersistenceCommand>,
    written: u64,
}

impl PersistenceWorker {
    pub(crate) fn new(
        log: Box<dyn ActionLogRepository>,
        event_rx: broadcast::Receiver<Event>,
        command_rx: mpsc::Receiver<PersistenceCommand>,
    ) -> Self {
        Self {
            log,
            event_rx,
            command_rx,
            written: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(
            target: "runtime::persistence",
            session = self.log.session_id(),
            "persistence worker started"
        );

        loop {
            tokio::select! {
                biased;

                event = self.event_rx.recv() => match event {
                    Ok(event) => self.handle_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => warn!(
                        target: "runtime::persistence",
                        skipped,
                        "persistence worker lagged; action records were lost"
                    ),
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                command = self.command_rx.recv() => match command {
                    Some(PersistenceCommand::Flush { reply }) => {
                        self.drain_pending();
                        let result = self.flush().map(|()| self.written);
                        if reply.send(result).is_err() {
                            debug!("Flush reply channel closed (caller dropped)");
                        }
                    }
                    Some(PersistenceCommand::Shutdown) | None => {
                        self.drain_pending();
                        break;
                    }
                },
            }
        }

        if let Err(error) = self.flush() {
            warn!(target: "runtime::persistence", %error, "final action log flush failed");
        }
        info!(
            target: "runtime::persistence",
            written = self.written,
            "persistence worker stopped"
        );
    }

    /// Handles events that were published before the current command.
    fn drain_pending(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => warn!(
                    target: "runtime::persistence",
                    skipped,
                    "persistence worker lagged; action records were lost"
                ),
                Err(_) => break,
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event::ActionResolved { battle, result } = event else {
            return;
        };

        let record = ActionRecord::from(&result);
        match self.log.append(&record) {
            Ok(offset) => {
                self.written += 1;
                debug!(
                    target: "runtime::persistence",
                    %battle,
                    sequence = record.sequence,
                    offset,
                    "action recorded"
                );
            }
            Err(error) => warn!(
                target: "runtime::persistence",
                %battle,
                sequence = record.sequence,
                %error,
                "failed to record action"
            ),
        }

        if let Err(error) = self.flush() {
            warn!(target: "runtime::persistence", %battle, %error, "failed to flush action log");
        }
    }

    fn flush(&mut self) -> Result<(), RepositoryError> {
        self.log.flush()
    }
}
