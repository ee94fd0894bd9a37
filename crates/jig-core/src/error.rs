use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Framing errors: the frame is rejected outright, no partial decode
    #[error("Frame length {len} does not match any recognized width")]
    FrameLength { len: usize },

    #[error("Invalid frame format: {message}")]
    InvalidFrameFormat { message: String },

    #[error("Invalid field value: {message}")]
    InvalidFieldValue { message: String },

    // Addressing errors
    #[error("Unknown group id: {id}")]
    UnknownGroup { id: u8 },

    #[error("Unknown command byte: {code:?}")]
    UnknownCommand { code: char },

    #[error("Device id out of range: {id}")]
    DeviceIdRange { id: u32 },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
