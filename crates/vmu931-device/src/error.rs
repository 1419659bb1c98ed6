/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] vmu931_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] vmu931_frame::FrameError),

    /// Protocol-level error (invalid resolution, bad selector).
    #[error("protocol error: {0}")]
    Proto(#[from] vmu931_proto::ProtoError),

    /// Reconciliation was requested before any status was observed.
    #[error("device status unknown; a status message must be observed before reconciling")]
    StatusUnknown,

    /// No status message arrived after a status request.
    #[error("no status message within {frames} frames of a status request")]
    StatusUnavailable { frames: usize },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
