/// Errors produced by the permit gate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    /// The gate was closed before a permit became available.
    ///
    /// Any caller suspended in `acquire` is woken with this error.
    #[error("Gate closed while waiting for a permit")]
    Closed,

    /// A refill interval of zero cannot drive a periodic timer.
    #[error("Refill interval must be greater than zero")]
    ZeroInterval,

    /// The refill task needs a Tokio runtime to run on.
    #[error("No Tokio runtime available to drive the refill task")]
    NoRuntime,
}
