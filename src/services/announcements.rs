use std::sync::{Arc, Weak};

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Timings;
use crate::error::StoreError;
use crate::models::announcement::{unread_for, Announcement};
use crate::models::user::CurrentUser;
use crate::store::AnnouncementStore;
use crate::tasks::TaskSet;
use crate::ui::badge::BadgeState;
use crate::ui::notice::{LOAD_FAILED, MARK_ALL_FAILED, MARK_ALL_SUCCESS};
use crate::ui::sound::Silent;
use crate::ui::{
    AnnouncementsModal, Badge, Banner, BannerId, BannerKind, BannerPhase, Chime, EventBus, Layout,
    Notice, UiEvent,
};

/// What a UI control asks the announcement manager to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementAction {
    /// "Mark as Read" on a banner or on a modal row. A banner is removed
    /// straight away, a modal row flips to read once the write succeeds.
    MarkRead {
        announcement_id: String,
        banner: Option<BannerId>,
    },
    /// The bulk control in the modal footer.
    MarkAllRead,
    /// The "mark read" control in the chat header, only honoured when the
    /// page has one.
    HeaderMarkRead,
    ViewAll,
    DismissBanner(BannerId),
    CloseModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    /// Not in the cached unread set.
    NotFound,
    /// The cached record already lists the current user.
    AlreadyRead,
}

/// Snapshot of the manager's cached state and visible UI.
#[derive(Debug, Clone)]
pub struct AnnouncementView {
    pub unread: Vec<Announcement>,
    pub banners: Vec<Banner>,
    pub badge: Option<Badge>,
    pub modal: Option<AnnouncementsModal>,
    pub last_notice: Option<Notice>,
}

#[derive(Default)]
struct State {
    /// Newest first.
    unread: Vec<Announcement>,
    banners: Vec<Banner>,
    badge: BadgeState,
    modal: Option<AnnouncementsModal>,
    last_notice: Option<Notice>,
    next_banner_id: BannerId,
    header_control_wired: bool,
}

/// Keeps the current user's unread announcements in sync with the store and
/// drives the banners, badge and modal that surface them.
pub struct AnnouncementManager {
    store: Arc<dyn AnnouncementStore>,
    user: CurrentUser,
    events: EventBus,
    layout: Layout,
    timings: Timings,
    chime: Arc<dyn Chime>,
    state: Mutex<State>,
    tasks: TaskSet,
}

impl AnnouncementManager {
    pub fn new(store: Arc<dyn AnnouncementStore>, user: CurrentUser, events: EventBus) -> Self {
        Self {
            store,
            user,
            events,
            layout: Layout::default(),
            timings: Timings::default(),
            chime: Arc::new(Silent),
            state: Mutex::new(State::default()),
            tasks: TaskSet::new(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_chime(mut self, chime: Arc<dyn Chime>) -> Self {
        self.chime = chime;
        self
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Load the unread set, queue the newest unread item as a pending banner,
    /// then follow inserts and refresh periodically until disposed.
    pub async fn start(self: &Arc<Self>) {
        info!("Starting announcements for user {}", self.user.id);

        if self.refresh_unread().await.is_ok() {
            self.schedule_pending_banner().await;
        }

        self.follow_inserts().await;
        self.start_refresh_loop();

        if self.layout.mark_read_control {
            self.state.lock().await.header_control_wired = true;
            debug!("Header mark-read control wired");
        }
    }

    /// Stop every timer and background task this manager started.
    pub fn dispose(&self) {
        let live = self.tasks.live();
        self.tasks.cancel_all();
        info!("Announcement manager disposed ({live} tasks cancelled)");
    }

    /// Re-fetch all announcements and replace the cached unread set.
    /// On failure the cached set is kept as it was.
    pub async fn refresh_unread(&self) -> Result<usize, StoreError> {
        let announcements = match self.store.list_announcements().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error loading announcements: {e}");
                return Err(e);
            }
        };

        let unread = unread_for(announcements, &self.user.id);
        let count = unread.len();

        let mut state = self.state.lock().await;
        state.unread = unread;
        self.sync_badge(&mut state);
        debug!("{count} unread announcements");
        Ok(count)
    }

    /// React to a row pushed by the store. Returns true if it was new to the user.
    pub async fn handle_insert(self: &Arc<Self>, announcement: Announcement) -> bool {
        if announcement.is_read_by(&self.user.id) {
            debug!("Ignoring announcement {} already read", announcement.id);
            return false;
        }

        let banner = {
            let mut state = self.state.lock().await;
            if state.unread.iter().any(|a| a.id == announcement.id) {
                debug!("Announcement {} already cached", announcement.id);
                return false;
            }
            state.unread.insert(0, announcement.clone());
            self.sync_badge(&mut state);
            self.push_banner(&mut state, &announcement, BannerKind::New)
        };

        if banner.auto_dismisses() {
            self.schedule_auto_dismiss(banner.id);
        }
        self.play_chime();
        true
    }

    /// Render a banner for `announcement`. New banners dismiss themselves.
    pub async fn show_banner(
        self: &Arc<Self>,
        announcement: &Announcement,
        kind: BannerKind,
    ) -> BannerId {
        let banner = {
            let mut state = self.state.lock().await;
            self.push_banner(&mut state, announcement, kind)
        };
        if banner.auto_dismisses() {
            self.schedule_auto_dismiss(banner.id);
        }
        banner.id
    }

    /// Remove a banner immediately (its close button).
    pub async fn dismiss_banner(&self, id: BannerId) {
        let mut state = self.state.lock().await;
        let before = state.banners.len();
        state.banners.retain(|b| b.id != id);
        if state.banners.len() != before {
            self.events.emit(UiEvent::BannerRemoved(id));
        }
    }

    /// Hide a banner, then remove it once the fade has run.
    pub async fn fade_out_banner(self: &Arc<Self>, id: BannerId) {
        {
            let mut state = self.state.lock().await;
            let Some(banner) = state.banners.iter_mut().find(|b| b.id == id) else {
                return;
            };
            if banner.phase == BannerPhase::Fading {
                return;
            }
            banner.phase = BannerPhase::Fading;
            self.events.emit(UiEvent::BannerFading(id));
        }

        let weak = Arc::downgrade(self);
        self.tasks.after(self.timings.fade, async move {
            if let Some(manager) = weak.upgrade() {
                manager.dismiss_banner(id).await;
            }
        });
    }

    /// Record the current user as a reader of one cached unread announcement.
    pub async fn mark_as_read(&self, announcement_id: &str) -> Result<MarkOutcome, StoreError> {
        let read_by = {
            let state = self.state.lock().await;
            let Some(announcement) = state.unread.iter().find(|a| a.id == announcement_id) else {
                return Ok(MarkOutcome::NotFound);
            };
            if announcement.is_read_by(&self.user.id) {
                return Ok(MarkOutcome::AlreadyRead);
            }
            announcement.read_by_with(&self.user.id)
        };

        if let Err(e) = self.store.update_read_by(announcement_id, &read_by).await {
            error!("Error marking announcement {announcement_id} as read: {e}");
            return Err(e);
        }

        let mut state = self.state.lock().await;
        state.unread.retain(|a| a.id != announcement_id);
        self.sync_badge(&mut state);
        if let Some(modal) = state.modal.as_mut() {
            if modal.mark_item_read(announcement_id) {
                self.events
                    .emit(UiEvent::ModalItemRead(announcement_id.to_string()));
            }
        }
        info!("Announcement {announcement_id} marked as read");
        Ok(MarkOutcome::Marked)
    }

    /// Mark every cached unread announcement as read, one write per record.
    ///
    /// Not transactional: when a write fails, the records written before it
    /// stay read and drop out of the unread set; the rest stay unread.
    pub async fn mark_all_as_read(self: &Arc<Self>) -> Result<usize, StoreError> {
        let pending: Vec<(String, Vec<String>)> = {
            let state = self.state.lock().await;
            state
                .unread
                .iter()
                .filter(|a| !a.is_read_by(&self.user.id))
                .map(|a| (a.id.clone(), a.read_by_with(&self.user.id)))
                .collect()
        };

        let mut written: Vec<String> = Vec::with_capacity(pending.len());
        for (id, read_by) in &pending {
            if let Err(e) = self.store.update_read_by(id, read_by).await {
                error!(
                    "Error marking all announcements as read ({} of {} written): {e}",
                    written.len(),
                    pending.len()
                );
                let mut state = self.state.lock().await;
                state.unread.retain(|a| !written.contains(&a.id));
                self.sync_badge(&mut state);
                self.notify(&mut state, Notice::error(MARK_ALL_FAILED));
                return Err(e);
            }
            written.push(id.clone());
        }

        let fading: Vec<BannerId> = {
            let mut state = self.state.lock().await;
            state.unread.clear();
            self.sync_badge(&mut state);
            if let Some(modal) = state.modal.as_mut() {
                modal.mark_all_read();
                for id in &written {
                    self.events.emit(UiEvent::ModalItemRead(id.clone()));
                }
            }
            self.notify(&mut state, Notice::success(MARK_ALL_SUCCESS));
            state.banners.iter().map(|b| b.id).collect()
        };
        for id in fading {
            self.fade_out_banner(id).await;
        }

        info!("Marked {} announcements as read", written.len());
        Ok(written.len())
    }

    /// Open the modal listing every announcement, read or not.
    pub async fn show_all(&self) -> Result<(), StoreError> {
        let announcements = match self.store.list_announcements().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error loading all announcements: {e}");
                let mut state = self.state.lock().await;
                self.notify(&mut state, Notice::error(LOAD_FAILED));
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        let modal = AnnouncementsModal::build(&announcements, &self.user.id, state.unread.len());
        state.modal = Some(modal.clone());
        self.events.emit(UiEvent::ModalOpened(modal));
        Ok(())
    }

    pub async fn close_modal(&self) {
        let mut state = self.state.lock().await;
        if state.modal.take().is_some() {
            self.events.emit(UiEvent::ModalClosed);
        }
    }

    /// Route a control's action. Failures are logged by the operations themselves.
    pub async fn dispatch(self: &Arc<Self>, action: AnnouncementAction) {
        match action {
            AnnouncementAction::MarkRead {
                announcement_id,
                banner,
            } => {
                if let Some(banner) = banner {
                    self.dismiss_banner(banner).await;
                }
                let _ = self.mark_as_read(&announcement_id).await;
            }
            AnnouncementAction::MarkAllRead => {
                let _ = self.mark_all_as_read().await;
            }
            AnnouncementAction::HeaderMarkRead => {
                if self.state.lock().await.header_control_wired {
                    let _ = self.mark_all_as_read().await;
                } else {
                    debug!("No header mark-read control on this page");
                }
            }
            AnnouncementAction::ViewAll => {
                let _ = self.show_all().await;
            }
            AnnouncementAction::DismissBanner(id) => self.dismiss_banner(id).await,
            AnnouncementAction::CloseModal => self.close_modal().await,
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.state.lock().await.unread.len()
    }

    pub async fn snapshot(&self) -> AnnouncementView {
        let state = self.state.lock().await;
        AnnouncementView {
            unread: state.unread.clone(),
            banners: state.banners.clone(),
            badge: state.badge.badge().cloned(),
            modal: state.modal.clone(),
            last_notice: state.last_notice.clone(),
        }
    }

    fn push_banner(
        &self,
        state: &mut State,
        announcement: &Announcement,
        kind: BannerKind,
    ) -> Banner {
        state.next_banner_id += 1;
        let banner = Banner::new(
            state.next_banner_id,
            announcement,
            kind,
            &self.user.id,
            state.unread.len(),
        );
        state.banners.push(banner.clone());
        self.events.emit(UiEvent::BannerShown(banner.clone()));
        banner
    }

    fn sync_badge(&self, state: &mut State) {
        let count = state.unread.len();
        if state.badge.update(count, &self.layout) {
            if let Some(badge) = state.badge.badge() {
                self.events.emit(UiEvent::BadgeUpdated(badge.clone()));
            }
        }
    }

    fn notify(&self, state: &mut State, notice: Notice) {
        state.last_notice = Some(notice.clone());
        self.events.emit(UiEvent::Notice(notice));
    }

    fn play_chime(&self) {
        if let Err(e) = self.chime.play() {
            warn!("Announcement sound play failed: {e}");
        }
    }

    async fn schedule_pending_banner(self: &Arc<Self>) {
        let Some(latest) = self.state.lock().await.unread.first().cloned() else {
            return;
        };

        let weak = Arc::downgrade(self);
        self.tasks.after(self.timings.pending_delay, async move {
            let Some(manager) = weak.upgrade() else {
                return;
            };
            let still_unread = manager
                .state
                .lock()
                .await
                .unread
                .iter()
                .any(|a| a.id == latest.id);
            if still_unread {
                manager.show_banner(&latest, BannerKind::Pending).await;
            }
        });
    }

    fn schedule_auto_dismiss(self: &Arc<Self>, id: BannerId) {
        let weak = Arc::downgrade(self);
        self.tasks.after(self.timings.banner_lifetime, async move {
            if let Some(manager) = weak.upgrade() {
                manager.fade_out_banner(id).await;
            }
        });
    }

    async fn follow_inserts(self: &Arc<Self>) {
        let mut inserts = match self.store.subscribe_inserts().await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to subscribe to announcement inserts: {e}");
                return;
            }
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        self.tasks.spawn(async move {
            while let Some(announcement) = inserts.next().await {
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                manager.handle_insert(announcement).await;
            }
            debug!("Announcement insert stream ended");
        });
    }

    fn start_refresh_loop(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let period = self.timings.refresh_interval;
        self.tasks.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                // Errors are already logged; keep the stale set until next tick.
                let _ = manager.refresh_unread().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAnnouncementStore;
    use crate::ui::sound::CountingChime;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;

    const ME: &str = "me";

    fn announcement(id: &str, minutes_ago: i64, read_by: &[&str]) -> Announcement {
        Announcement {
            id: id.into(),
            text: format!("announcement {id}"),
            timestamp: Utc::now() - ChronoDuration::minutes(minutes_ago),
            created_by: "admin".into(),
            read_by: read_by.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn manager(store: Arc<MemoryAnnouncementStore>) -> Arc<AnnouncementManager> {
        Arc::new(AnnouncementManager::new(
            store,
            CurrentUser::new(ME, "me"),
            EventBus::default(),
        ))
    }

    /// Let spawned tasks run without moving the paused clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_refresh_filters_read_and_keeps_order() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![
            announcement("old", 30, &[]),
            announcement("read", 20, &[ME]),
            announcement("new", 10, &["someone"]),
        ]));
        let mgr = manager(store);

        assert_eq!(mgr.refresh_unread().await.unwrap(), 2);
        let view = mgr.snapshot().await;
        let ids: Vec<_> = view.unread.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(view.badge.unwrap().text, "2");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_set() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        store.insert(announcement("b", 0, &[]));
        store.set_fail_reads(true);
        assert!(mgr.refresh_unread().await.is_err());
        assert_eq!(mgr.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_mark_as_read_is_idempotent() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        assert_eq!(mgr.mark_as_read("a").await.unwrap(), MarkOutcome::Marked);
        assert_eq!(mgr.mark_as_read("a").await.unwrap(), MarkOutcome::NotFound);

        // A refresh must not resurrect it, and the store lists the user once.
        mgr.refresh_unread().await.unwrap();
        assert_eq!(mgr.unread_count().await, 0);
        let row = store.get("a").unwrap();
        assert_eq!(row.read_by.iter().filter(|u| *u == ME).count(), 1);
        assert_eq!(store.write_count(), 1);

        let badge = mgr.snapshot().await.badge.unwrap();
        assert!(!badge.visible);
    }

    #[tokio::test]
    async fn test_mark_as_read_failure_keeps_record_unread() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        store.fail_writes_after(0);
        assert!(mgr.mark_as_read("a").await.is_err());
        assert_eq!(mgr.unread_count().await, 1);
        // No user-facing notice for single marks.
        assert!(mgr.snapshot().await.last_notice.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_all_issues_one_write_per_record() {
        let rows = (0..5)
            .map(|i| announcement(&format!("a{i}"), i, &[]))
            .collect();
        let store = Arc::new(MemoryAnnouncementStore::with_rows(rows));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        assert_eq!(mgr.mark_all_as_read().await.unwrap(), 5);
        assert_eq!(store.write_count(), 5);

        let view = mgr.snapshot().await;
        assert!(view.unread.is_empty());
        assert_eq!(view.last_notice, Some(Notice::success(MARK_ALL_SUCCESS)));
        assert!(!view.badge.unwrap().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_all_partial_failure_is_not_rolled_back() {
        let rows = vec![
            announcement("a", 1, &[]),
            announcement("b", 2, &[]),
            announcement("c", 3, &[]),
        ];
        let store = Arc::new(MemoryAnnouncementStore::with_rows(rows));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        store.fail_writes_after(1);
        assert!(mgr.mark_all_as_read().await.is_err());

        assert!(store.get("a").unwrap().is_read_by(ME));
        assert!(!store.get("b").unwrap().is_read_by(ME));
        let view = mgr.snapshot().await;
        let ids: Vec<_> = view.unread.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(view.last_notice, Some(Notice::error(MARK_ALL_FAILED)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_all_fades_out_banners() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store);
        mgr.refresh_unread().await.unwrap();
        let a = mgr.snapshot().await.unread[0].clone();
        mgr.show_banner(&a, BannerKind::Pending).await;

        mgr.mark_all_as_read().await.unwrap();
        let banners = mgr.snapshot().await.banners;
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].phase, BannerPhase::Fading);

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert!(mgr.snapshot().await.banners.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_already_read_is_ignored() {
        let store = Arc::new(MemoryAnnouncementStore::new());
        let chime = Arc::new(CountingChime::default());
        let mgr = Arc::new(
            AnnouncementManager::new(store, CurrentUser::new(ME, "me"), EventBus::default())
                .with_chime(chime.clone()),
        );

        assert!(!mgr.handle_insert(announcement("a", 0, &[ME])).await);
        let view = mgr.snapshot().await;
        assert_eq!(view.unread.len(), 0);
        assert!(view.badge.is_none());
        assert!(view.banners.is_empty());
        assert_eq!(chime.plays(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_shows_new_banner_that_dismisses_itself() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("old", 5, &[])]));
        let chime = Arc::new(CountingChime::default());
        chime.set_broken(true);
        let mgr = Arc::new(
            AnnouncementManager::new(store, CurrentUser::new(ME, "me"), EventBus::default())
                .with_chime(chime.clone()),
        );
        mgr.refresh_unread().await.unwrap();

        assert!(mgr.handle_insert(announcement("fresh", 0, &[])).await);
        // A broken sound does not stop anything else.
        assert_eq!(chime.plays(), 1);

        let view = mgr.snapshot().await;
        assert_eq!(view.unread[0].id, "fresh");
        assert_eq!(view.badge.unwrap().text, "2");
        assert_eq!(view.banners.len(), 1);
        assert_eq!(view.banners[0].kind, BannerKind::New);
        assert_eq!(view.banners[0].unread_count, 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(mgr.snapshot().await.banners[0].phase, BannerPhase::Fading);

        tokio::time::sleep(Duration::from_millis(300)).await;
        settle().await;
        assert!(mgr.snapshot().await.banners.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_shows_pending_banner_and_follows_inserts() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![
            announcement("older", 10, &[]),
            announcement("latest", 1, &[]),
        ]));
        let mgr = manager(store.clone());
        mgr.start().await;
        assert!(mgr.snapshot().await.banners.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        let banners = mgr.snapshot().await.banners;
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].kind, BannerKind::Pending);
        assert_eq!(banners[0].announcement_id, "latest");

        // Pending banners stay put.
        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(mgr.snapshot().await.banners[0].phase, BannerPhase::Shown);

        store.publish("pushed", "admin");
        settle().await;
        assert_eq!(mgr.unread_count().await, 3);

        mgr.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh_picks_up_external_changes() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store.clone());
        mgr.start().await;
        assert_eq!(mgr.unread_count().await, 1);

        // Marked read from another device.
        store.update_read_by("a", &[ME.to_string()]).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(mgr.unread_count().await, 0);

        mgr.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_refresh() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store.clone());
        mgr.start().await;
        mgr.dispose();

        store.update_read_by("a", &[ME.to_string()]).await.unwrap();
        tokio::time::sleep(Duration::from_secs(90)).await;
        settle().await;
        assert_eq!(mgr.unread_count().await, 1);
        assert!(mgr.snapshot().await.banners.is_empty());
    }

    #[tokio::test]
    async fn test_show_all_lists_everything() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![
            announcement("read", 2, &[ME]),
            announcement("unread", 1, &[]),
        ]));
        let mgr = manager(store.clone());
        mgr.refresh_unread().await.unwrap();

        mgr.dispatch(AnnouncementAction::ViewAll).await;
        let modal = mgr.snapshot().await.modal.unwrap();
        assert_eq!(modal.items.len(), 2);
        assert_eq!(modal.unread_count, 1);
        assert!(modal.shows_mark_all());

        mgr.dispatch(AnnouncementAction::MarkRead {
            announcement_id: "unread".into(),
            banner: None,
        })
        .await;
        let modal = mgr.snapshot().await.modal.unwrap();
        assert!(modal.items.iter().all(|i| i.read));
        assert!(!modal.shows_mark_all());

        mgr.dispatch(AnnouncementAction::CloseModal).await;
        assert!(mgr.snapshot().await.modal.is_none());
    }

    #[tokio::test]
    async fn test_show_all_failure_reports_error() {
        let store = Arc::new(MemoryAnnouncementStore::new());
        store.set_fail_reads(true);
        let mgr = manager(store);

        assert!(mgr.show_all().await.is_err());
        let view = mgr.snapshot().await;
        assert!(view.modal.is_none());
        assert_eq!(view.last_notice, Some(Notice::error(LOAD_FAILED)));
    }

    #[tokio::test]
    async fn test_banner_mark_read_removes_banner() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = manager(store);
        mgr.refresh_unread().await.unwrap();
        let a = mgr.snapshot().await.unread[0].clone();
        let banner = mgr.show_banner(&a, BannerKind::Pending).await;

        let mut events = mgr.events.subscribe();
        mgr.dispatch(AnnouncementAction::MarkRead {
            announcement_id: "a".into(),
            banner: Some(banner),
        })
        .await;

        assert_eq!(events.recv().await.unwrap(), UiEvent::BannerRemoved(banner));
        let view = mgr.snapshot().await;
        assert!(view.banners.is_empty());
        assert!(view.unread.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_header_control_needs_layout() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![announcement("a", 1, &[])]));
        let mgr = Arc::new(
            AnnouncementManager::new(store.clone(), CurrentUser::new(ME, "me"), EventBus::default())
                .with_layout(Layout::bare()),
        );
        mgr.start().await;

        mgr.dispatch(AnnouncementAction::HeaderMarkRead).await;
        assert_eq!(store.write_count(), 0);
        assert_eq!(mgr.unread_count().await, 1);
        // Without anchors there is nowhere to put a badge.
        assert!(mgr.snapshot().await.badge.is_none());
        mgr.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_header_control_marks_everything_read() {
        let store = Arc::new(MemoryAnnouncementStore::with_rows(vec![
            announcement("a", 5, &[]),
            announcement("b", 1, &[]),
        ]));
        let mgr = manager(store.clone());
        mgr.start().await;
        assert_eq!(mgr.unread_count().await, 2);

        mgr.dispatch(AnnouncementAction::HeaderMarkRead).await;
        assert_eq!(store.write_count(), 2);
        assert!(store.get("a").unwrap().is_read_by(ME));
        assert!(store.get("b").unwrap().is_read_by(ME));

        let view = mgr.snapshot().await;
        assert!(view.unread.is_empty());
        assert!(!view.badge.unwrap().visible);
        assert_eq!(view.last_notice.unwrap().message, MARK_ALL_SUCCESS);
        mgr.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_insert_pushed_twice_is_counted_once() {
        let store = Arc::new(MemoryAnnouncementStore::new());
        let chime = Arc::new(CountingChime::default());
        let mgr = Arc::new(
            AnnouncementManager::new(store, CurrentUser::new(ME, "me"), EventBus::default())
                .with_chime(chime.clone()),
        );

        assert!(mgr.handle_insert(announcement("dup", 0, &[])).await);
        assert!(!mgr.handle_insert(announcement("dup", 0, &[])).await);

        let view = mgr.snapshot().await;
        assert_eq!(view.unread.len(), 1);
        assert_eq!(view.banners.len(), 1);
        assert_eq!(view.badge.unwrap().text, "1");
        assert_eq!(chime.plays(), 1);
    }
}
