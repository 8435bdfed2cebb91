//! Binary entry point: read configuration, open the archive and drive the
//! Ratatui event loop until the user exits.
use camille_archive::{
    init_logging, run_app, AdminGate, App, AppConfig, KeyValueStore, MemoryStore, SqliteStore,
    Store,
};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    // Without a log file the app still works; there is just nowhere to write.
    if let Err(err) = init_logging(&config.log_path()) {
        eprintln!("logging disabled: {err:#}");
    }
    info!(data_dir = %config.data_dir.display(), "starting archive");

    let backend: Box<dyn KeyValueStore> = match SqliteStore::open(&config.db_path()) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("falling back to in-memory storage: {err:#}");
            Box::new(MemoryStore::new())
        }
    };

    let store = Store::load(backend);
    let mut app = App::new(store, AdminGate::new(config.admin_password.clone()));
    run_app(&mut app)
}
