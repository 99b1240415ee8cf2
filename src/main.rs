use std::cell::RefCell;
use std::rc::Rc;

use dotenv::dotenv;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use maze_chase::config::Config;
use maze_chase::error::RunError;
use maze_chase::infra::{CompositeObserver, DefaultObserver, Heatmap, HeatmapObserver};
use maze_chase::planners::rl::{DemoRunner, prepare_selector};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("maze_chase=info,warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), RunError> {
    dotenv().ok();
    init_logging();

    let config = Config::from_env()?;
    let train = &config.train;

    let mut rng = match train.seed {
        Some(seed) => {
            tracing::info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let heatmap = Rc::new(RefCell::new(Heatmap::new(
        config.maze.width as usize,
        config.maze.height as usize,
    )));
    let mut observer = CompositeObserver::new(vec![
        Box::new(DefaultObserver),
        Box::new(HeatmapObserver::new(Rc::clone(&heatmap))),
    ]);

    let mut selector = prepare_selector(&config, &mut rng, &mut observer)?;

    if train.demo_episodes > 0 {
        let mut demo = DemoRunner::new(&config);
        demo.run(&mut selector, train.demo_episodes, &mut rng, &mut observer)?;
    }

    if let Some(folder) = &train.reports_folder {
        match heatmap.try_borrow() {
            Ok(heatmap) => {
                tracing::info!("{} death(s) recorded on the heatmap", heatmap.total_deaths());
                match heatmap.write_report(folder) {
                    Ok(files) => {
                        for file in files {
                            tracing::info!("Heatmap written to {}", file.display());
                        }
                    }
                    Err(err) => tracing::warn!("Failed to write heatmap report: {}", err),
                }
            }
            Err(err) => tracing::warn!("Heatmap unavailable, skipping report: {}", err),
        }
    }

    Ok(())
}
