use std::future::Future;
use std::pin::Pin;

/// Work handed to the runtime for execution off the wizard's update path.
/// Every variant other than `None` yields exactly one message.
pub enum Command<Msg> {
    /// Do nothing
    None,

    /// Await a future on the async runtime and send its result as a message
    Perform(Pin<Box<dyn Future<Output = Msg> + Send>>),

    /// Run a blocking job (file output) on the blocking pool
    Blocking(Box<dyn FnOnce() -> Msg + Send>),
}

impl<Msg> Command<Msg> {
    /// Helper to create a command that performs an async operation
    pub fn perform<F, T>(future: F, to_msg: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        Msg: Send + 'static,
    {
        Command::Perform(Box::pin(async move {
            let result = future.await;
            to_msg(result)
        }))
    }

    /// Helper to create a command that runs a blocking job
    pub fn blocking(job: impl FnOnce() -> Msg + Send + 'static) -> Self {
        Command::Blocking(Box::new(job))
    }
}

impl<Msg> Default for Command<Msg> {
    fn default() -> Self {
        Command::None
    }
}
