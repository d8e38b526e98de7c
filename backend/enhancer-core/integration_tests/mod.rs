mod backend_client;
mod executor;
mod helpers;
mod orchestrator;
