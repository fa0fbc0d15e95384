#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Bit notation could not be parsed into a [BitBuffer](crate::bitbuffer::BitBuffer).
    #[error("invalid bit notation at position {pos}: {msg}")]
    Parse { pos: usize, msg: String },

    /// The dispatch worker pool could not be constructed.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
}

pub type Result<T> = std::result::Result<T, Error>;
