use thiserror::Error;

/// Errors produced while decoding TUIO messages.
///
/// None of these abort a decode cycle: the offending message is skipped and
/// the remaining messages of the datagram are still dispatched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A known command arrived with missing or mistyped arguments.
    #[error("malformed {command} message: {source}")]
    Malformed {
        command: &'static str,
        #[source]
        source: tuio_osc::OscError,
    },
}

impl ClientError {
    pub(crate) fn malformed(command: &'static str) -> impl FnOnce(tuio_osc::OscError) -> Self {
        move |source| Self::Malformed { command, source }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
