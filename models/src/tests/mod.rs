mod provider;
mod request;
mod settings;
mod usage;
