use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use niamchat_ui::config::Config;
use niamchat_ui::db;
use niamchat_ui::models::user::CurrentUser;
use niamchat_ui::prefs::{FilePreferences, PreferenceStore, USERNAME_KEY};
use niamchat_ui::services::announcements::{AnnouncementAction, AnnouncementManager};
use niamchat_ui::services::themes::{ThemeAction, ThemeManager};
use niamchat_ui::store::{AnnouncementStore, MemoryAnnouncementStore, PgAnnouncementStore};
use niamchat_ui::ui::badge::BadgeAnchor;
use niamchat_ui::ui::sound::TerminalBell;
use niamchat_ui::ui::{EventBus, KeyPress, UiEvent};

#[derive(Parser)]
#[command(name = "niamchat", about = "Announcements and themes for the niamchat client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow announcements live and drive the UI from stdin commands
    Watch,
    /// One-shot announcement operations
    Announcements {
        #[command(subcommand)]
        action: AnnouncementCommand,
    },
    /// Theme selection
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
}

#[derive(Subcommand)]
enum AnnouncementCommand {
    /// List every announcement with its read state
    List,
    /// Mark every unread announcement as read
    MarkAll,
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Show the catalog
    List,
    /// Select a theme by key
    Set { key: String },
    /// Advance to the next theme
    Cycle,
}

const WATCH_HELP: &str = "commands: read <id> | dismiss <banner> | all | mark-all | header-read | close | \
picker | outside | esc | theme <key> | cycle | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let prefs = FilePreferences::open(&config.prefs_path)?;
    info!("Preferences at {}", prefs.path().display());
    let prefs: Arc<dyn PreferenceStore> = Arc::new(prefs);
    let events = EventBus::default();

    match cli.command {
        Command::Watch => {
            let store = connect_store(&config).await?;
            let user = current_user(&config, prefs.as_ref());
            watch(store, user, prefs, events, &config).await
        }
        Command::Announcements { action } => {
            let store = connect_store(&config).await?;
            let user = current_user(&config, prefs.as_ref());
            let manager = Arc::new(
                AnnouncementManager::new(store.clone(), user, events)
                    .with_timings(config.timings),
            );
            match action {
                AnnouncementCommand::List => {
                    let rows = store.list_announcements().await?;
                    if rows.is_empty() {
                        println!("No announcements have been made yet.");
                    }
                    for a in rows {
                        let mark = if a.is_read_by(&manager.user().id) { "✓" } else { "•" };
                        println!(
                            "{mark} [{}] {} by {} ({})",
                            a.id,
                            a.text,
                            a.creator_label(&manager.user().id),
                            a.time_label()
                        );
                    }
                }
                AnnouncementCommand::MarkAll => {
                    manager.refresh_unread().await?;
                    let marked = manager.mark_all_as_read().await?;
                    println!("Marked {marked} announcements as read.");
                }
            }
            manager.dispose();
            Ok(())
        }
        Command::Theme { action } => {
            let themes = Arc::new(ThemeManager::new(prefs, events).with_timings(config.timings));
            themes.initialize();
            match action {
                ThemeCommand::List => {
                    let current = themes.current_theme_info();
                    for t in themes.all_themes() {
                        let active = if t.key == current.key { "*" } else { " " };
                        let pearls = if t.has_pearls { " ✨" } else { "" };
                        println!("{active} {:<8} {}: {}{pearls}", t.key, t.name, t.description);
                    }
                }
                ThemeCommand::Set { key } => {
                    let theme = themes
                        .select_theme(&key)
                        .ok_or_else(|| anyhow::anyhow!("Unknown theme: {key}"))?;
                    println!("Theme applied: {}", theme.name);
                }
                ThemeCommand::Cycle => {
                    let theme = themes.cycle_theme();
                    println!("Theme applied: {}", theme.name);
                }
            }
            themes.dispose();
            Ok(())
        }
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn AnnouncementStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");
            Ok(Arc::new(PgAnnouncementStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, using offline announcement store");
            Ok(Arc::new(MemoryAnnouncementStore::new()))
        }
    }
}

fn current_user(config: &Config, prefs: &dyn PreferenceStore) -> CurrentUser {
    match &config.user_id {
        Some(id) => {
            let username = prefs
                .get(USERNAME_KEY)
                .ok()
                .flatten()
                .unwrap_or_else(|| id.clone());
            CurrentUser::new(id.clone(), username)
        }
        None => {
            let user = CurrentUser::fallback(prefs);
            warn!("NIAMCHAT_USER_ID not set, using temporary identity {}", user.id);
            user
        }
    }
}

async fn watch(
    store: Arc<dyn AnnouncementStore>,
    user: CurrentUser,
    prefs: Arc<dyn PreferenceStore>,
    events: EventBus,
    config: &Config,
) -> anyhow::Result<()> {
    let mut rx = events.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => println!("{}", render(&event)),
                Err(RecvError::Lagged(n)) => warn!("Renderer skipped {n} ui events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let themes = Arc::new(ThemeManager::new(prefs, events.clone()).with_timings(config.timings));
    themes.initialize();

    let announcements = Arc::new(
        AnnouncementManager::new(store, user, events)
            .with_timings(config.timings)
            .with_chime(Arc::new(TerminalBell)),
    );
    announcements.start().await;

    println!("{WATCH_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        let arg = parts.next();

        match (cmd, arg) {
            ("quit", _) | ("exit", _) => break,
            ("read", Some(id)) => {
                let banner = announcements
                    .snapshot()
                    .await
                    .banners
                    .iter()
                    .find(|b| b.announcement_id == id)
                    .map(|b| b.id);
                announcements
                    .dispatch(AnnouncementAction::MarkRead {
                        announcement_id: id.to_string(),
                        banner,
                    })
                    .await;
            }
            ("dismiss", Some(id)) => match id.parse() {
                Ok(id) => announcements.dispatch(AnnouncementAction::DismissBanner(id)).await,
                Err(_) => println!("banner ids are numbers"),
            },
            ("all", _) => announcements.dispatch(AnnouncementAction::ViewAll).await,
            ("mark-all", _) => announcements.dispatch(AnnouncementAction::MarkAllRead).await,
            ("header-read", _) => announcements.dispatch(AnnouncementAction::HeaderMarkRead).await,
            ("close", _) => announcements.dispatch(AnnouncementAction::CloseModal).await,
            ("picker", _) => themes.dispatch(ThemeAction::TogglePicker),
            ("outside", _) => themes.dispatch(ThemeAction::OutsideClick),
            ("esc", _) => themes.dispatch(ThemeAction::Key(KeyPress::plain("Escape"))),
            ("theme", Some(key)) => themes.dispatch(ThemeAction::Select(key.to_string())),
            ("cycle", _) => themes.dispatch(ThemeAction::Key(KeyPress {
                key: "t".into(),
                ctrl: true,
                alt: true,
            })),
            _ => println!("{WATCH_HELP}"),
        }
    }

    announcements.dispose();
    themes.dispose();
    drop(announcements);
    drop(themes);
    printer.abort();
    Ok(())
}

fn render(event: &UiEvent) -> String {
    match event {
        UiEvent::BannerShown(b) => format!(
            "[banner {}] {}\n  {}\n  By {} · {}\n  read {} | {}",
            b.id,
            b.title,
            b.text,
            b.creator,
            b.time,
            b.announcement_id,
            b.view_all_label()
        ),
        UiEvent::BannerFading(id) => format!("[banner {id}] fading"),
        UiEvent::BannerRemoved(id) => format!("[banner {id}] removed"),
        UiEvent::BadgeUpdated(badge) => {
            let anchors: Vec<&str> = badge
                .anchors
                .iter()
                .map(|a| match a {
                    BadgeAnchor::AnnounceButton => "announce",
                    BadgeAnchor::SidebarNotifications => "sidebar",
                })
                .collect();
            if badge.visible {
                format!("[badge {}] {}", anchors.join("+"), badge.text)
            } else {
                format!("[badge {}] hidden", anchors.join("+"))
            }
        }
        UiEvent::ModalOpened(modal) => {
            let mut out = String::from("── Announcements");
            if let Some(label) = modal.unread_label() {
                out.push_str(&format!(" ({label})"));
            }
            if modal.is_empty() {
                out.push_str("\n  No announcements have been made yet.");
            }
            for item in &modal.items {
                let mark = match item.status_icon() {
                    "checkmark" => "✓",
                    _ => "•",
                };
                out.push_str(&format!(
                    "\n  {mark} [{}] {} · {}\n    {}",
                    item.announcement_id, item.creator, item.time, item.text
                ));
            }
            if modal.shows_mark_all() {
                out.push_str("\n  mark-all | close");
            } else {
                out.push_str("\n  close");
            }
            out
        }
        UiEvent::ModalItemRead(id) => format!("[modal] {id} read"),
        UiEvent::ModalClosed => "[modal] closed".into(),
        UiEvent::Notice(notice) => format!("[{:?}] {}", notice.kind, notice.message),
        UiEvent::ThemeApplied { key, class } => format!("[theme] {key} ({class})"),
        UiEvent::ActiveOptionChanged(key) => format!("[picker] active option {key}"),
        UiEvent::PickerOpened => "[picker] open".into(),
        UiEvent::PickerClosed => "[picker] closed".into(),
        UiEvent::ThemeNoticeShown(n) => {
            let mut out = format!("[{}] {}: {}", n.icon, n.title, n.description);
            if !n.pearls.is_empty() {
                out.push_str(&format!(" {}", n.pearls));
            }
            out
        }
        UiEvent::ThemeNoticeHidden => "[theme notice] hiding".into(),
        UiEvent::ThemeNoticeRemoved => "[theme notice] removed".into(),
    }
}
