//! Device picker handshake with the UI.
//!
//! Each prompt gets a request number. The UI only shows the picker after
//! `AppEvent::PickerOpened(n)` arrives and tags its answer with `n`, so an
//! answer meant for an earlier prompt can never settle a later one.

use crate::domain::models::{AppEvent, DevicePick, PickerAnswer};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

pub struct DevicePicker {
    answers: Mutex<mpsc::UnboundedReceiver<PickerAnswer>>,
    next_request: AtomicU64,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl DevicePicker {
    pub fn new(
        answers: mpsc::UnboundedReceiver<PickerAnswer>,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            answers: Mutex::new(answers),
            next_request: AtomicU64::new(0),
            event_sender,
        }
    }

    /// Ask the UI to show the picker and wait for its answer.
    ///
    /// `None` when the UI side has gone away.
    pub async fn prompt(&self) -> Option<DevicePick> {
        let mut answers = self.answers.lock().await;
        let request = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.event_sender.send(AppEvent::PickerOpened(request));

        while let Some(answer) = answers.recv().await {
            if answer.request == request {
                return Some(answer.pick);
            }
            debug!("Ignoring answer for stale picker prompt {}", answer.request);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> (
        DevicePicker,
        mpsc::UnboundedSender<PickerAnswer>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let (answer_tx, answer_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (DevicePicker::new(answer_rx, event_tx), answer_tx, event_rx)
    }

    async fn opened(events: &mut mpsc::UnboundedReceiver<AppEvent>) -> u64 {
        loop {
            if let Some(AppEvent::PickerOpened(request)) = events.recv().await {
                return request;
            }
        }
    }

    #[tokio::test]
    async fn test_answer_for_older_prompt_is_ignored() {
        let (picker, answers, mut events) = picker();

        // Cancel left over from a picker that was already closed
        answers
            .send(PickerAnswer {
                request: 0,
                pick: DevicePick::Cancelled,
            })
            .unwrap();

        let (pick, ()) = tokio::join!(picker.prompt(), async {
            let request = opened(&mut events).await;
            answers
                .send(PickerAnswer {
                    request,
                    pick: DevicePick::Selected(0xA1B2),
                })
                .unwrap();
        });

        assert_eq!(pick, Some(DevicePick::Selected(0xA1B2)));
    }

    #[tokio::test]
    async fn test_cancel_settles_its_own_prompt() {
        let (picker, answers, mut events) = picker();

        let (first, ()) = tokio::join!(picker.prompt(), async {
            let request = opened(&mut events).await;
            answers
                .send(PickerAnswer {
                    request,
                    pick: DevicePick::Cancelled,
                })
                .unwrap();
        });
        assert_eq!(first, Some(DevicePick::Cancelled));

        let (second, ()) = tokio::join!(picker.prompt(), async {
            let request = opened(&mut events).await;
            assert_eq!(request, 2);
            answers
                .send(PickerAnswer {
                    request,
                    pick: DevicePick::Selected(7),
                })
                .unwrap();
        });
        assert_eq!(second, Some(DevicePick::Selected(7)));
    }

    #[tokio::test]
    async fn test_prompt_ends_when_ui_hangs_up() {
        let (picker, answers, _events) = picker();
        drop(answers);
        assert_eq!(picker.prompt().await, None);
    }
}
