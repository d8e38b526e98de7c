mod config;
mod fallback;
mod prompt;
mod providers;
mod store;
