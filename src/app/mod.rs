pub mod interactive;

pub use interactive::run_session;
