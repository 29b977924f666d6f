//! Headless model of what the page shows. Managers mutate it and announce
//! every change on the [`event::EventBus`]; front ends render from the events.

pub mod badge;
pub mod banner;
pub mod event;
pub mod layout;
pub mod modal;
pub mod notice;
pub mod picker;
pub mod sound;

pub use badge::{Badge, BadgeAnchor};
pub use banner::{Banner, BannerId, BannerKind, BannerPhase};
pub use event::{EventBus, UiEvent};
pub use layout::Layout;
pub use modal::{AnnouncementsModal, ModalItem};
pub use notice::{Notice, NoticeKind};
pub use picker::{KeyPress, PickerState, ThemeNotice};
pub use sound::Chime;
