use super::{Notifier, NotifyError, Template, WordOfTheDay};
use crate::server::config::MailConfig;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

/// Sends the rendered template to every configured recipient in a single
/// message.
///
/// STARTTLS is used when the server offers it. The login defaults to the from
/// address when no SMTP username is configured, and authentication is skipped
/// entirely without a password.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    template: Template,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, template: Template) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from_address)?;
        let to = config
            .to_addresses
            .iter()
            .map(|address| parse_mailbox(address))
            .collect::<Result<Vec<_>, _>>()?;

        let tls = TlsParameters::new(config.host.clone())?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls));

        if !config.password.is_empty() {
            let username = if config.username.is_empty() {
                config.from_address.clone()
            } else {
                config.username.clone()
            };
            builder = builder.credentials(Credentials::new(username, config.password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
            template,
        })
    }

    fn compose(&self, subject: &str, data: &WordOfTheDay) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        Ok(builder.body(self.template.render(data))?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

#[tonic::async_trait]
impl Notifier for SmtpMailer {
    #[tracing::instrument(skip_all, fields(subject = subject, recipients = self.to.len()))]
    async fn send_rendered(&self, subject: &str, data: &WordOfTheDay) -> Result<(), NotifyError> {
        let message = self.compose(subject, data)?;
        let response = self.transport.send(message).await?;
        tracing::debug!(code = %response.code(), "Mail accepted by SMTP server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            schedule: "0 9 * * *".parse().unwrap(),
            host: "smtp.example.com".into(),
            port: 587,
            username: String::new(),
            password: "secret".into(),
            from_address: "words@example.com".into(),
            to_addresses: vec!["ada@example.com".into(), "grace@example.com".into()],
            template: None,
        }
    }

    #[test]
    fn composes_html_message_for_every_recipient() {
        let mailer = SmtpMailer::new(&config(), Template::embedded()).unwrap();
        let message = mailer
            .compose(
                "My Word Of The Day",
                &WordOfTheDay {
                    word: "lexicon".into(),
                    definition: String::new(),
                },
            )
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: My Word Of The Day"));
        assert!(raw.contains("From: words@example.com"));
        assert!(raw.contains("ada@example.com"));
        assert!(raw.contains("grace@example.com"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("lexicon"));
    }

    #[test]
    fn rejects_bad_recipient() {
        let mut config = config();
        config.to_addresses.push("not an address".into());
        let err = SmtpMailer::new(&config, Template::embedded()).err().unwrap();
        assert!(matches!(err, NotifyError::Address { address, .. } if address == "not an address"));
    }
}
