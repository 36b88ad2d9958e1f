mod periodic_callback;
mod timer_scope;

pub use periodic_callback::PeriodicCallback;
pub use timer_scope::TimerScope;
