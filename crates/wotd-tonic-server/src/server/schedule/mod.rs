//! Scheduled word-of-the-day delivery.
//!
//! [`run`] sleeps until the next time matched by a [`CronSchedule`], then runs
//! one [`run_cycle`]: pick a random word and hand it to a [`Notifier`]. A cycle
//! never stops the loop. Failures are logged and counted, and the next fire
//! time is computed as usual. The loop ends when its [`CancellationToken`] is
//! cancelled.

pub mod cron;

pub use cron::CronSchedule;

use crate::server::{
    notify::{Notifier, WordOfTheDay},
    service::random::random_word,
    telemetry::{record_mail_failure, record_mail_sent},
};
use chrono::Local;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wotd_tonic_core::WordQuerier;

/// Subject line of every scheduled message.
pub const SUBJECT: &str = "My Word Of The Day";

/// What a single scheduled cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Sent { word_id: i32 },
    NoWords,
    FetchFailed,
    SendFailed,
}

/// Picks a random word and sends it.
///
/// Only read access to the store is required, so the job is handed a
/// [`WordQuerier`] and nothing else.
pub async fn run_cycle<Q, N>(querier: &Q, notifier: &N) -> CycleOutcome
where
    Q: WordQuerier + ?Sized,
    N: Notifier + ?Sized,
{
    let word = match random_word(querier).await {
        Ok(Some(word)) => word,
        Ok(None) => {
            tracing::info!("No words have been added - skipping");
            return CycleOutcome::NoWords;
        }
        Err(err) => {
            tracing::error!(error = %err, "Scheduled mail skipped");
            record_mail_failure();
            return CycleOutcome::FetchFailed;
        }
    };

    let word_id = word.id;
    match notifier.send_rendered(SUBJECT, &WordOfTheDay::from(word)).await {
        Ok(()) => {
            tracing::info!(word_id, "Sent word of the day");
            record_mail_sent();
            CycleOutcome::Sent { word_id }
        }
        Err(err) => {
            tracing::error!(word_id, error = %err, "Unable to send word of the day");
            record_mail_failure();
            CycleOutcome::SendFailed
        }
    }
}

/// Runs [`run_cycle`] at every time matched by `schedule` until `token` is
/// cancelled.
///
/// Fire times are computed in the local timezone. A schedule that never
/// matches again ends the loop.
pub async fn run<Q, N>(
    schedule: CronSchedule,
    querier: Arc<Q>,
    notifier: Arc<N>,
    token: CancellationToken,
) where
    Q: WordQuerier + ?Sized,
    N: Notifier + ?Sized,
{
    tracing::info!(%schedule, "Mail schedule started");

    loop {
        let now = Local::now();
        let Some(next) = schedule.next_after(&now) else {
            tracing::warn!(%schedule, "Schedule has no upcoming fire time; stopping");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(next = %next.to_rfc3339(), "Next scheduled mail");

        tokio::select! {
            () = token.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }

        run_cycle(querier.as_ref(), notifier.as_ref()).await;
    }

    tracing::info!("Mail schedule stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::notify::NotifyError;
    use std::sync::Mutex;
    use wotd_tonic_core::{StoreError, Word};

    struct FixedQuerier(Result<Vec<Word>, &'static str>);

    #[tonic::async_trait]
    impl WordQuerier for FixedQuerier {
        async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
            self.0.clone().map_err(StoreError::query)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<(String, WordOfTheDay)>>,
    }

    #[tonic::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_rendered(
            &self,
            subject: &str,
            data: &WordOfTheDay,
        ) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), data.clone()));
            if self.fail {
                Err(NotifyError::Template {
                    path: "word_of_the_day.html".into(),
                    source: std::io::ErrorKind::NotFound.into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn aurora() -> Word {
        Word {
            id: 7,
            word: "aurora".into(),
            custom_definition: "a natural light display".into(),
        }
    }

    #[tokio::test]
    async fn sends_a_stored_word_with_fixed_subject() {
        let notifier = RecordingNotifier::default();
        let outcome = run_cycle(&FixedQuerier(Ok(vec![aurora()])), &notifier).await;

        assert_eq!(outcome, CycleOutcome::Sent { word_id: 7 });
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![(
                "My Word Of The Day".to_string(),
                WordOfTheDay {
                    word: "aurora".into(),
                    definition: "a natural light display".into(),
                }
            )]
        );
    }

    #[tokio::test]
    async fn empty_store_sends_nothing() {
        let notifier = RecordingNotifier::default();
        let outcome = run_cycle(&FixedQuerier(Ok(vec![])), &notifier).await;

        assert_eq!(outcome, CycleOutcome::NoWords);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_sends_nothing() {
        let notifier = RecordingNotifier::default();
        let outcome = run_cycle(&FixedQuerier(Err("connection reset")), &notifier).await;

        assert_eq!(outcome, CycleOutcome::FetchFailed);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_failure_is_reported() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let outcome = run_cycle(&FixedQuerier(Ok(vec![aurora()])), &notifier).await;

        assert_eq!(outcome, CycleOutcome::SendFailed);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn loop_stops_on_cancellation() {
        let token = CancellationToken::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let handle = tokio::spawn(run(
            "0 0 1 1 *".parse().unwrap(),
            Arc::new(FixedQuerier(Ok(vec![aurora()]))),
            notifier.clone(),
            token.clone(),
        ));

        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("schedule loop did not stop")
            .unwrap();
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
