// Fault boundary: panic isolation for request handling
use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A contained panic: payload message plus the backtrace of the panic site
#[derive(Debug, Clone)]
pub struct Fault {
    pub message: String,
    pub backtrace: String,
}

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed normally
    Success(T),
    /// Execution panicked
    Panicked(Fault),
}

/// Install a process-wide panic hook that stashes the panic-site backtrace
/// for the guard on the same thread. Chains to the previous hook; idempotent.
pub fn install_backtrace_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

/// Drive a future to completion, catching any panic raised while polling it
///
/// The panic hook runs on the polling thread, which is also the thread that
/// observes the unwind here, so the stashed backtrace belongs to this fault.
pub async fn execute_guarded_async<F, T>(future: F) -> PanicGuardResult<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => PanicGuardResult::Success(value),
        Err(payload) => PanicGuardResult::Panicked(Fault {
            message: panic_message(payload.as_ref()),
            backtrace: take_backtrace(),
        }),
    }
}

fn take_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
