mod cli;
mod config;
mod icons;
mod routes;
