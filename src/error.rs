use thiserror::Error;

/// Errors reported by the synthesis engine.
///
/// All errors surface synchronously at the call site; nothing is retried
/// or caught internally, and a failed call writes no output samples past
/// the failure point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SynthError {
    /// A filter was configured with an out-of-range or non-finite
    /// parameter. The offending filter keeps its previous state.
    #[error("invalid {0} filter parameters")]
    InvalidFilterParameter(&'static str),

    /// A resonator peak gain adjustment with a non-positive or non-finite
    /// gain.
    #[error("invalid resonator peak gain")]
    InvalidPeakGain,

    /// The same `FrameParams` value was supplied to two consecutive
    /// `generate_frame` calls. Each call must receive fresh parameters;
    /// this usually means the caller mutated and re-passed one buffer.
    #[error("FrameParams value must not be re-used between calls")]
    ReusedFrameParams,
}
