mod backup;
mod help;
mod lifecycle;
mod setup;
mod update;
