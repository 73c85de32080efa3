use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

/// Polled once per frame, must not block.
pub trait StopSignal {
    fn should_stop(&mut self) -> bool;
}

/// Stop flag shared with whoever wants to end the run, usually the Ctrl-C
/// listener.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Raises the flag on the first Ctrl-C. The listener lives on its own
    /// thread and does nothing else.
    pub fn listen_for_ctrl_c(&self) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let flag = self.clone();

        thread::Builder::new().name("ctrl-c".to_string()).spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        log::info!("Interrupt received, stopping after the current frame");
                        flag.raise();
                    }
                    Err(e) => log::error!("Failed to listen for Ctrl-C: {e}"),
                }
            });
        })?;

        Ok(())
    }
}

impl StopSignal for InterruptFlag {
    fn should_stop(&mut self) -> bool {
        self.is_raised()
    }
}
