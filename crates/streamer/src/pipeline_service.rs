// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Actor wrapper around the pipeline.
//!
//! The subscriber hands `(topic, payload)` pairs to a cloneable
//! [`PipelineHandle`]; a single service task owns the pipeline and processes
//! messages sequentially, which preserves delivery order and keeps every
//! failure local to its message.

use crate::errors::PipelineError;
use crate::pipeline::Pipeline;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

#[derive(Debug)]
pub enum PipelineCommand {
    Process { topic: String, payload: Vec<u8> },
    Stats(oneshot::Sender<PipelineStats>),
    Shutdown,
}

/// Per-message outcome counters, for operators and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Messages decoded, projected and flushed successfully.
    pub processed: u64,
    /// Messages dropped because the payload was not a JSON object.
    pub decode_failures: u64,
    /// Messages dropped because the store flush failed.
    pub write_failures: u64,
}

#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::UnboundedSender<PipelineCommand>,
}

impl PipelineHandle {
    pub fn process(
        &self,
        topic: String,
        payload: Vec<u8>,
    ) -> Result<(), mpsc::error::SendError<PipelineCommand>> {
        self.tx.send(PipelineCommand::Process { topic, payload })
    }

    pub async fn stats(&self) -> Result<PipelineStats, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::Stats(response_tx))
            .map_err(|e| format!("Failed to send stats command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive stats response: {}", e))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<PipelineCommand>> {
        self.tx.send(PipelineCommand::Shutdown)
    }
}

pub struct PipelineService {
    pipeline: Pipeline,
    stats: PipelineStats,
    rx: mpsc::UnboundedReceiver<PipelineCommand>,
}

impl PipelineService {
    pub fn new(pipeline: Pipeline) -> (Self, PipelineHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let service = Self {
            pipeline,
            stats: PipelineStats::default(),
            rx,
        };

        let handle = PipelineHandle { tx };

        (service, handle)
    }

    pub async fn run(mut self) {
        debug!("Pipeline service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                PipelineCommand::Process { topic, payload } => {
                    match self.pipeline.handle_message(&topic, &payload).await {
                        Ok(()) => {
                            self.stats.processed += 1;
                            debug!("Data written successfully");
                        }
                        Err(PipelineError::Decode(e)) => {
                            self.stats.decode_failures += 1;
                            error!("Error parsing message on {topic}: {e}");
                        }
                        Err(PipelineError::Write(e)) => {
                            self.stats.write_failures += 1;
                            error!("Error writing data to InfluxDB: {e}");
                        }
                    }
                }

                PipelineCommand::Stats(response_tx) => {
                    if response_tx.send(self.stats).is_err() {
                        error!("Failed to send stats response - receiver dropped");
                    }
                }

                PipelineCommand::Shutdown => {
                    debug!("Pipeline service shutting down");
                    break;
                }
            }
        }

        debug!("Pipeline service stopped");
    }
}
