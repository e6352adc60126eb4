//! Scoresheet server (default binary).
//!
//! Hosts one game behind the TCP adapter. Commands are applied in arrival order on
//! this thread; the adapter's runtime only moves bytes.

use anyhow::Result;
use tracing::info;

use tenpin::adapter::{Adapter, Session};

fn main() -> Result<()> {
    tenpin::init_logging();

    let Some(mut adapter) = Adapter::start_from_env()? else {
        info!("adapter disabled via TENPIN_DISABLED; nothing to serve");
        return Ok(());
    };

    let mut session = Session::new();
    while let Some(inbound) = adapter.recv() {
        for msg in session.handle(inbound) {
            adapter.send(msg);
        }
    }

    info!(total = session.sheet().total_score(), "adapter stopped");
    Ok(())
}
