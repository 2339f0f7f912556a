use std::rc::Rc;
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use schedule_engine::{run_event_loop, Dashboard, EventHandle, ReqwestSource};

use super::config::{self, DashboardConfig};
use super::console::run_console;
use super::terminal::TerminalSurface;

pub fn run_app() -> anyhow::Result<()> {
    let config_path = config::resolve_path(std::env::args().nth(1));
    let (config, problem) = match config::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (DashboardConfig::default(), Some(err)),
    };

    engine_logging::initialize(config.log_destination, config.log_level(), &config.log_file);
    if let Some(err) = problem {
        engine_warn!("{}; using defaults", err);
    }
    engine_info!(
        "dashboard on {} with {} windows, refresh every {:?}",
        config.api_base,
        config.windows.len(),
        config.refresh_period()
    );

    let source = Arc::new(ReqwestSource::new(config.source_settings())?);
    let surface = Rc::new(TerminalSurface::new(config.visible_rows));
    let dashboard = Dashboard::new(source, surface.clone(), config.feeds());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let (events, receiver) = EventHandle::channel();
        let ((), console) = tokio::join!(
            run_event_loop(&dashboard, receiver, config.refresh_period()),
            run_console(&dashboard, &surface, events),
        );
        console
    })?;

    engine_info!("dashboard stopped");
    Ok(())
}
