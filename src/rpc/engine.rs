//! Command dispatcher: runs named operations over one correlated link.
//!
//! Every operation shares the same connection, subscription and
//! correlation state; only the reply handling differs:
//!
//! | Operation                         | Reply                          |
//! |-----------------------------------|--------------------------------|
//! | `enable_metrics`/`disable_metrics`| optional ack, silence is fine  |
//! | `req_height`/`get_max_height`     | required text                  |
//! | `store_file`                      | chunked download               |

use log::{info, warn};

use super::chunked::{ChunkedDownload, TransferReport};
use super::codec::{self, Command};
use super::correlator::{Correlator, Outcome};
use super::transport::Transport;
use crate::app::commands::{Operation, ReplyPolicy};
use crate::app::events::LinkEvent;
use crate::app::ports::{EventSink, SinkProvider};
use crate::config::LinkConfig;
use crate::error::{Error, Result};

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Fire-and-forget command; carries the acknowledgement if one came.
    Ack(Option<String>),
    /// Textual reply to a query.
    Text(String),
    /// Download summary (may be incomplete).
    Transfer(TransferReport),
}

/// Dispatches [`Operation`]s against a subscribed correlator.
pub struct Dispatcher<'a, T: Transport> {
    link: &'a mut Correlator<T>,
    config: &'a LinkConfig,
}

impl<'a, T: Transport> Dispatcher<'a, T> {
    pub fn new(link: &'a mut Correlator<T>, config: &'a LinkConfig) -> Self {
        Self { link, config }
    }

    /// Run one operation to completion.
    pub async fn run<P, E>(&mut self, op: Operation, sinks: &mut P, events: &mut E) -> Result<OperationResult>
    where
        P: SinkProvider,
        E: EventSink,
    {
        info!("running {}", op);
        match op.command() {
            Some((command, policy)) => self.simple(&command, policy, events).await,
            None => {
                let download =
                    ChunkedDownload::new(self.config.stats_timeout(), self.config.chunk_timeout());
                let report = download.run(&mut *self.link, sinks, events).await?;
                Ok(OperationResult::Transfer(report))
            }
        }
    }

    /// Send one command line and apply its reply policy.
    async fn simple<E: EventSink>(
        &mut self,
        command: &Command,
        policy: ReplyPolicy,
        events: &mut E,
    ) -> Result<OperationResult> {
        let outcome = self
            .link
            .send_and_await(command, self.config.command_timeout())
            .await?;
        let timed_out = outcome == Outcome::TimedOut;
        let reply = outcome.into_text();

        if let Some(text) = &reply {
            if codec::is_error_reply(text) {
                warn!("{} rejected: {}", command.verb(), text);
                return Err(Error::Peripheral(text.clone()));
            }
        }

        events.emit(&LinkEvent::CommandReply {
            verb: command.verb(),
            reply: reply.clone(),
        });

        match (policy, reply) {
            (ReplyPolicy::Optional, reply) => Ok(OperationResult::Ack(reply)),
            (ReplyPolicy::Required, Some(text)) => Ok(OperationResult::Text(text)),
            (ReplyPolicy::Required, None) if timed_out => Err(Error::TimedOut),
            (ReplyPolicy::Required, None) => Err(Error::NoResponse),
        }
    }
}
