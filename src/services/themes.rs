use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::models::theme::{self, Theme, THEMES};
use crate::prefs::{PreferenceStore, THEME_KEY};
use crate::tasks::{ScheduledTask, TaskSet};
use crate::ui::picker::NoticePhase;
use crate::ui::{EventBus, KeyPress, Layout, PickerState, ThemeNotice, UiEvent};

/// What a theme control asks the manager to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeAction {
    TogglePicker,
    /// A picker option, identified by its theme key.
    Select(String),
    /// A click that landed outside the picker.
    OutsideClick,
    Key(KeyPress),
    CloseNotice,
}

struct State {
    current: &'static Theme,
    /// Classes on the document root. Holds exactly one theme marker.
    root_classes: BTreeSet<String>,
    picker: PickerState,
    /// Option highlighted in the picker, if the page has one.
    active_option: Option<&'static str>,
    notice: Option<ThemeNotice>,
}

/// Owns the active visual theme: applies it to the document root, keeps it
/// in local preferences and confirms user choices with a short notice.
pub struct ThemeManager {
    prefs: Arc<dyn PreferenceStore>,
    events: EventBus,
    layout: Layout,
    timings: Timings,
    state: Mutex<State>,
    notice_timer: Mutex<Option<ScheduledTask>>,
    tasks: TaskSet,
}

impl ThemeManager {
    pub fn new(prefs: Arc<dyn PreferenceStore>, events: EventBus) -> Self {
        Self {
            prefs,
            events,
            layout: Layout::default(),
            timings: Timings::default(),
            state: Mutex::new(State {
                current: theme::default_theme(),
                root_classes: BTreeSet::from([theme::default_theme().class_name()]),
                picker: PickerState::Closed,
                active_option: None,
                notice: None,
            }),
            notice_timer: Mutex::new(None),
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

    /// Restore the saved theme (or the default) and apply it.
    pub fn initialize(&self) -> &'static Theme {
        let saved = match self.prefs.get(THEME_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to read theme preference: {e}");
                None
            }
        };
        let key = saved.unwrap_or_else(|| theme::DEFAULT_THEME.to_string());
        self.apply_theme(&key)
    }

    /// Switch the root marker class to `key`, falling back to the default
    /// theme for unknown keys, and persist the result.
    pub fn apply_theme(&self, key: &str) -> &'static Theme {
        let theme = match theme::find(key) {
            Some(t) => t,
            None => {
                warn!("Theme \"{key}\" not found, using default.");
                theme::default_theme()
            }
        };

        {
            let mut state = self.lock_state();
            state.root_classes.retain(|c| !theme::is_theme_class(c));
            state.root_classes.insert(theme.class_name());
            state.current = theme;
            if self.layout.theme_picker {
                state.active_option = Some(theme.key);
            }
        }

        if let Err(e) = self.prefs.set(THEME_KEY, theme.key) {
            warn!("Failed to save theme preference: {e}");
        }

        self.events.emit(UiEvent::ThemeApplied {
            key: theme.key,
            class: theme.class_name(),
        });
        if self.layout.theme_picker {
            self.events.emit(UiEvent::ActiveOptionChanged(theme.key));
        }
        info!("Theme applied: {}", theme.name);
        theme
    }

    /// User picked `key` in the picker. Unknown keys are ignored.
    ///
    /// The notice auto-hide timer runs on the current Tokio runtime; without
    /// one the notice stays until [`hide_notice`](Self::hide_notice).
    pub fn select_theme(self: &Arc<Self>, key: &str) -> Option<&'static Theme> {
        let Some(theme) = theme::find(key) else {
            warn!("Theme \"{key}\" not found.");
            return None;
        };
        self.apply_theme(theme.key);
        self.close_picker();
        self.show_notice(theme);
        Some(theme)
    }

    /// Move to the next theme in catalog order (the Ctrl+Alt+T shortcut).
    pub fn cycle_theme(self: &Arc<Self>) -> &'static Theme {
        let next = theme::next_after(self.current_theme().key);
        self.select_theme(next.key);
        next
    }

    pub fn toggle_picker(&self) {
        match self.picker_state() {
            PickerState::Open => self.close_picker(),
            PickerState::Closed => self.open_picker(),
        }
    }

    pub fn open_picker(&self) {
        if !self.layout.theme_picker {
            return;
        }
        let mut state = self.lock_state();
        if state.picker == PickerState::Closed {
            state.picker = PickerState::Open;
            self.events.emit(UiEvent::PickerOpened);
        }
    }

    pub fn close_picker(&self) {
        let mut state = self.lock_state();
        if state.picker == PickerState::Open {
            state.picker = PickerState::Closed;
            self.events.emit(UiEvent::PickerClosed);
        }
    }

    pub fn handle_key(self: &Arc<Self>, key: &KeyPress) {
        if key.is_escape() {
            self.close_picker();
        } else if key.is_cycle_shortcut() {
            self.cycle_theme();
        }
    }

    pub fn dispatch(self: &Arc<Self>, action: ThemeAction) {
        match action {
            ThemeAction::TogglePicker => self.toggle_picker(),
            ThemeAction::Select(key) => {
                self.select_theme(&key);
            }
            ThemeAction::OutsideClick => self.close_picker(),
            ThemeAction::Key(key) => self.handle_key(&key),
            ThemeAction::CloseNotice => self.hide_notice(),
        }
    }

    /// Show the confirmation notice, restarting its auto-hide timer.
    fn show_notice(self: &Arc<Self>, theme: &'static Theme) {
        let notice = ThemeNotice::for_theme(theme);
        self.lock_state().notice = Some(notice.clone());
        self.events.emit(UiEvent::ThemeNoticeShown(notice));

        let weak = Arc::downgrade(self);
        let timer = ScheduledTask::after(self.timings.theme_notice_lifetime, async move {
            if let Some(manager) = weak.upgrade() {
                manager.hide_notice();
            }
        });
        // Replacing the handle aborts the previous timer.
        *self.notice_timer.lock().unwrap_or_else(|e| e.into_inner()) = Some(timer);
    }

    /// Hide the notice and remove it after the fade, unless it was shown again meanwhile.
    /// The removal needs a Tokio runtime; without one the notice stays hidden.
    pub fn hide_notice(self: &Arc<Self>) {
        {
            let mut state = self.lock_state();
            match state.notice.as_mut() {
                Some(notice) if notice.phase == NoticePhase::Shown => {
                    notice.phase = NoticePhase::Fading;
                }
                _ => return,
            }
        }
        self.events.emit(UiEvent::ThemeNoticeHidden);

        let weak = Arc::downgrade(self);
        self.tasks.after(self.timings.fade, async move {
            let Some(manager) = weak.upgrade() else {
                return;
            };
            let removed = {
                let mut state = manager.lock_state();
                let fading = state
                    .notice
                    .as_ref()
                    .is_some_and(|n| n.phase == NoticePhase::Fading);
                if fading {
                    state.notice = None;
                }
                fading
            };
            if removed {
                manager.events.emit(UiEvent::ThemeNoticeRemoved);
            }
        });
    }

    pub fn dispose(&self) {
        self.notice_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let live = self.tasks.live();
        self.tasks.cancel_all();
        debug!("Theme manager disposed ({live} timers cancelled)");
    }

    pub fn current_theme(&self) -> &'static Theme {
        self.lock_state().current
    }

    pub fn current_theme_info(&self) -> Theme {
        *self.current_theme()
    }

    pub fn all_themes(&self) -> &'static [Theme] {
        &THEMES
    }

    pub fn root_classes(&self) -> BTreeSet<String> {
        self.lock_state().root_classes.clone()
    }

    pub fn picker_state(&self) -> PickerState {
        self.lock_state().picker
    }

    pub fn active_option(&self) -> Option<&'static str> {
        self.lock_state().active_option
    }

    pub fn notice(&self) -> Option<ThemeNotice> {
        self.lock_state().notice.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
