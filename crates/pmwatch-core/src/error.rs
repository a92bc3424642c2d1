use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("link failed: {0}")]
    LinkFailed(String),
    #[error("link not ready after {0:?}")]
    LinkTimeout(Duration),
    #[error("failed to start acquisition thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
