use serde::Serialize;
use tokio::sync::broadcast;

use super::badge::Badge;
use super::banner::{Banner, BannerId};
use super::modal::AnnouncementsModal;
use super::notice::Notice;
use super::picker::ThemeNotice;

/// Every visible change the managers make.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiEvent {
    BannerShown(Banner),
    BannerFading(BannerId),
    BannerRemoved(BannerId),
    BadgeUpdated(Badge),
    ModalOpened(AnnouncementsModal),
    ModalItemRead(String),
    ModalClosed,
    Notice(Notice),
    ThemeApplied { key: &'static str, class: String },
    ActiveOptionChanged(&'static str),
    PickerOpened,
    PickerClosed,
    ThemeNoticeShown(ThemeNotice),
    ThemeNoticeHidden,
    ThemeNoticeRemoved,
}

/// Fan-out of [`UiEvent`]s to whoever renders them. Emitting with no
/// subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: UiEvent) {
        tracing::debug!(?event, "ui event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}
