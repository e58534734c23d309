//! Error taxonomy surfaced to the kiosk user.
//!
//! Storage and parsing faults never show up here: they are recovered
//! where they happen by falling back to defaults.

use thiserror::Error;

/// Faults raised by the BLE control channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Bluetooth is not available on this computer")]
    UnsupportedEnvironment,
    #[error("No roulette device was selected")]
    UserCancelled,
    #[error("Could not connect to the roulette device: {0}")]
    ConnectionError(String),
    #[error("A connection attempt is already in progress")]
    ConnectInProgress,
    #[error("Not connected to a roulette device")]
    NotConnected,
    #[error("Failed to send the start command: {0}")]
    TransmissionError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Import document is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Import document must be a JSON array of questions")]
    NotAnArray,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Incorrect PIN")]
    AuthenticationFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("That action is not available on the current screen")]
    WrongStep,
    #[error("Question number {0} does not exist")]
    IndexOutOfRange(u8),
    #[error("Choice {0} does not exist")]
    ChoiceOutOfRange(usize),
    #[error("Question {0} is missing from the bank")]
    MissingQuestion(String),
    #[error("This question is currently disabled")]
    QuestionDisabled,
}
