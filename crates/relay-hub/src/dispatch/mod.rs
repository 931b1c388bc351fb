//! Backend demultiplexing

mod dispatcher;

pub use dispatcher::BackendDispatcher;
