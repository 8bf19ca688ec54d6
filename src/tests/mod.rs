mod booleans;
mod conditionals;
mod context;
mod functions;
mod loops;
