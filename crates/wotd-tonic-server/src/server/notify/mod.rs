//! Outbound notifications.
//!
//! The scheduled job only needs one thing from a notifier: render a message
//! for a word and send it with a subject. [`Notifier`] captures that, and
//! [`SmtpMailer`] implements it over SMTP with an HTML [`Template`].

mod mailer;
mod template;

pub use mailer::SmtpMailer;
pub use template::Template;

use std::path::PathBuf;
use wotd_tonic_core::Word;

/// Data handed to the template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordOfTheDay {
    pub word: String,
    pub definition: String,
}

impl From<Word> for WordOfTheDay {
    fn from(word: Word) -> Self {
        Self {
            word: word.word,
            definition: word.custom_definition,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("invalid mailbox `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("unable to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("unable to send mail: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("unable to read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders and dispatches a message.
#[tonic::async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send_rendered(&self, subject: &str, data: &WordOfTheDay) -> Result<(), NotifyError>;
}
