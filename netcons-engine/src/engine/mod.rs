mod console;
mod error;
mod pipeline;
mod worker;

pub use self::{
    console::{
        ConsoleDescriptor, ConsoleDriver, ConsoleRegistry, LocalConsoleRegistry, NetConsole,
        RegistryError,
    },
    error::PipelineError,
    pipeline::{ConsoleProducer, ControlInjector, Pipeline},
    worker::{ConsoleMailbox, Worker, WorkerState, WorkerStatus},
};

pub mod prelude {
    pub use super::{
        ConsoleDriver, ConsoleProducer, ConsoleRegistry, ControlInjector, LocalConsoleRegistry,
        Pipeline, PipelineError,
    };
}
