use crate::{
    app::{self, DaemonCommand},
    daemon_response, ipc_server,
    modules::{self, notifications::NotificationTray},
    paths::SlatPaths,
    placement::IndicatorService,
    render_backend::HeadlessBackend,
    settings::Settings,
    timer::TimerScheduler,
};
use anyhow::{Context, Result};
use std::{
    os::unix::io::AsRawFd,
    path::Path,
    sync::{atomic::Ordering, Arc},
};
use tokio::sync::mpsc::UnboundedSender;

pub fn initialize_server(paths: SlatPaths, action: Option<DaemonCommand>, should_daemonize: bool) -> Result<ForkResult> {
    let (ui_send, mut ui_recv) = tokio::sync::mpsc::unbounded_channel();

    // Icon image paths are resolved relative to the config directory.
    std::env::set_current_dir(paths.get_config_dir())
        .with_context(|| format!("Failed to change working directory to {}", paths.get_config_dir().display()))?;

    log::info!("Loading paths: {}", &paths);

    let settings = match Settings::load(&paths.settings_file()) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Starting with default settings: {:?}", err);
            Settings::default()
        }
    };

    if should_daemonize {
        let fork_result = do_detach(paths.get_log_file())?;

        if fork_result == ForkResult::Parent {
            return Ok(ForkResult::Parent);
        }
    }

    println!(
        r#"
┏━━━━━━━━━━━━━━━━━━━━━━━━┓
┃Initializing slat daemon┃
┗━━━━━━━━━━━━━━━━━━━━━━━━┛
    "#
    );

    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], move |_| {
        log::info!("Shutting down slat daemon...");
        if let Err(e) = crate::application_lifecycle::send_exit() {
            log::error!("Failed to send application shutdown event to workers: {:?}", e);
            std::process::exit(1);
        }
    });

    // initialize the handlers and tasks running asynchronously
    init_async_part(paths.clone(), ui_send.clone());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;
    rt.block_on(async move {
        let mut app = app::App {
            service: IndicatorService::new(Box::<HeadlessBackend>::default()),
            modules: modules::create_modules(),
            notifications: NotificationTray::new(),
            settings,
            timers: TimerScheduler::new(ui_send),
            paths,
        };

        app.bootstrap();

        // if an action was given to the daemon initially, execute it first.
        if let Some(action) = action {
            app.handle_command(action);
        }

        crate::loop_select_exiting! {
            Some(ui_event) = ui_recv.recv() => {
                app.handle_command(ui_event);
            },
            else => break,
        }
    });
    log::info!("main application loop finished");

    Ok(ForkResult::Child)
}

fn init_async_part(paths: SlatPaths, ui_send: UnboundedSender<app::DaemonCommand>) {
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().expect("Failed to initialize tokio runtime");
        rt.block_on(async {
            let filewatch_join_handle = {
                let ui_send = ui_send.clone();
                let paths = paths.clone();
                tokio::spawn(async move { run_filewatch(paths.config_dir, ui_send).await })
            };

            let ipc_server_join_handle = {
                let ui_send = ui_send.clone();
                tokio::spawn(async move { ipc_server::run_server(ui_send, paths.get_ipc_socket_file()).await })
            };

            let forward_exit_to_app_handle = {
                let ui_send = ui_send.clone();
                tokio::spawn(async move {
                    // Wait for application exit event
                    let _ = crate::application_lifecycle::recv_exit().await;
                    log::debug!("Forward task received exit event");
                    // Then forward that to the application
                    let _ = ui_send.send(app::DaemonCommand::KillServer);
                })
            };

            let result = tokio::try_join!(filewatch_join_handle, ipc_server_join_handle, forward_exit_to_app_handle);

            if let Err(e) = result {
                log::error!("Slat exiting with error: {:?}", e);
            }
        })
    });
}

/// Watch the configuration directory for changes to the settings file,
/// sending reload events to the app when it changes.
async fn run_filewatch<P: AsRef<Path>>(config_dir: P, evt_send: UnboundedSender<app::DaemonCommand>) -> Result<()> {
    use notify::{RecommendedWatcher, RecursiveMode, Watcher};

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(notify::Event { kind: notify::EventKind::Modify(_), paths, .. }) => {
                let relevant_files_changed =
                    paths.iter().any(|path| path.file_name().map(|name| name == "slat.json").unwrap_or(false));
                if relevant_files_changed {
                    if let Err(err) = tx.send(()) {
                        log::warn!("Error forwarding file update event: {:?}", err);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Encountered Error While Watching Files: {}", e),
        },
        notify::Config::default(),
    )?;
    watcher.watch(config_dir.as_ref(), RecursiveMode::NonRecursive)?;

    // make sure to not trigger reloads too much by only accepting one reload every 500ms.
    let debounce_done = Arc::new(std::sync::atomic::AtomicBool::new(true));

    crate::loop_select_exiting! {
        Some(()) = rx.recv() => {
            let debounce_done = debounce_done.clone();
            if debounce_done.swap(false, Ordering::SeqCst) {
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    debounce_done.store(true, Ordering::SeqCst);
                });

                let (daemon_resp_sender, mut daemon_resp_response) = daemon_response::create_pair();
                // Give the writing editor a moment to finish, otherwise the
                // settings file occasionally reads back empty.
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                evt_send.send(app::DaemonCommand::ReloadSettings(daemon_resp_sender))?;
                tokio::spawn(async move {
                    match daemon_resp_response.recv().await {
                        Some(daemon_response::DaemonResponse::Success(_)) => log::info!("Reloaded settings successfully"),
                        Some(daemon_response::DaemonResponse::Failure(e)) => eprintln!("{}", e),
                        None => log::error!("No response to settings-reload request"),
                    }
                });
            }
        },
        else => break
    };
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForkResult {
    Parent,
    Child,
}

/// detach the process from the terminal, also redirecting stdout and stderr to LOG_FILE
fn do_detach(log_file_path: impl AsRef<Path>) -> Result<ForkResult> {
    // detach from terminal
    match unsafe { nix::unistd::fork()? } {
        nix::unistd::ForkResult::Child => {
            nix::unistd::setsid()?;
            match unsafe { nix::unistd::fork()? } {
                nix::unistd::ForkResult::Parent { .. } => std::process::exit(0),
                nix::unistd::ForkResult::Child => {}
            }
        }
        nix::unistd::ForkResult::Parent { .. } => {
            return Ok(ForkResult::Parent);
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .unwrap_or_else(|_| panic!("Error opening log file ({}), for writing", log_file_path.as_ref().to_string_lossy()));
    let fd = file.as_raw_fd();

    if nix::unistd::isatty(1)? {
        nix::unistd::dup2(fd, std::io::stdout().as_raw_fd())?;
    }
    if nix::unistd::isatty(2)? {
        nix::unistd::dup2(fd, std::io::stderr().as_raw_fd())?;
    }

    Ok(ForkResult::Child)
}
