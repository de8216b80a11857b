use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use log::LevelFilter;
use usergrid_core::views::{CounterView, StatusBar, UsersPage, USERS_CONTAINER};
use usergrid_core::{SessionContext, UserSource};
use usergrid_engine::{FileUserSource, HttpUserSource, MemoryGrid, SimulatedUserSource};
use usergrid_logging::{grid_debug, grid_info, grid_warn};

use super::config::{read_config, AppConfig, SourceConfig, CONFIG_FILENAME};
use super::logging;
use super::render::{render, Frame};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    let loaded = read_config(&config_path);
    let destination = match &loaded {
        Ok(Some(config)) => config.log,
        _ => Default::default(),
    };
    logging::initialize(destination, default_level());

    let config = match loaded {
        Ok(Some(config)) => {
            grid_info!("Loaded config from {:?}", config_path);
            config
        }
        Ok(None) => {
            grid_info!("No config at {:?}; using defaults", config_path);
            AppConfig::default()
        }
        Err(err) => {
            grid_warn!("{}; using defaults", err);
            AppConfig::default()
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run_session(config))
}

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn build_source(config: &AppConfig) -> Rc<dyn UserSource> {
    let inner: Rc<dyn UserSource> = match &config.source {
        SourceConfig::Http { url } => {
            grid_info!("Fetching users from {}", url);
            Rc::new(HttpUserSource::new(url.clone(), config.fetch.to_settings()))
        }
        SourceConfig::File { path } => {
            grid_info!("Reading users from {:?}", path);
            Rc::new(FileUserSource::new(path.clone()))
        }
    };

    let mut simulated = SimulatedUserSource::new(inner)
        .with_latency(Duration::from_millis(config.latency_ms));
    if let Some(simulation) = config.simulate {
        simulated = simulated.failing(simulation.kind, simulation.times);
    }
    Rc::new(simulated)
}

async fn run_session(config: AppConfig) -> anyhow::Result<()> {
    let context = SessionContext::new();
    let grid = MemoryGrid::with_containers([USERS_CONTAINER]);

    let status = StatusBar::new(&context);
    let counter = CounterView::new(&context);
    let users = Rc::new(UsersPage::new(
        &context,
        build_source(&config),
        Rc::new(grid.clone()),
    ));
    let handle = users
        .attach_grid(&config.grid)
        .context("failed to attach users grid")?;

    let print = |label: &str| {
        let users_view = users.view();
        let frame = Frame {
            label,
            rendered_at: Utc::now(),
            status: status.view(),
            counter: counter.view(),
            users: &users_view,
        };
        for line in render(&frame) {
            println!("{line}");
        }
    };

    print("mounted");

    let mut attempt = 0;
    loop {
        let page = Rc::clone(&users);
        let task = tokio::task::spawn_local(async move {
            if page.view().error.is_some() {
                page.retry().await;
            } else {
                page.load().await;
            }
        });

        while !task.is_finished() {
            let count = counter.increment();
            grid_debug!("Counter at {} while busy={}", count, context.notifier().is_loading());
            tokio::time::sleep(TICK).await;
        }
        task.await.context("load task failed")?;
        print(if attempt == 0 { "loaded" } else { "retried" });

        if users.view().error.is_none() || attempt >= config.max_retries {
            break;
        }
        attempt += 1;
        grid_info!("Retrying load ({}/{})", attempt, config.max_retries);
    }

    if users.view().row_count > 0 {
        grid.click_row(handle, 0)
            .context("failed to click first row")?;
        let pumped = users.pump_grid_events();
        grid_debug!("Pumped {} grid events", pumped);
        print("clicked");
    }

    match Rc::try_unwrap(users) {
        Ok(page) => page.teardown(),
        Err(_) => grid_warn!("Users page still shared at shutdown"),
    }
    counter.teardown();
    status.teardown();

    grid_info!(
        "Session closed with {} subscribers and {} grid instances left",
        context.notifier().subscriber_count(),
        grid.instance_count()
    );
    Ok(())
}
