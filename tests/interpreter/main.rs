mod classes;
mod control_flow;
mod errors;
mod functions;
mod helpers;
mod inheritance;
mod operators;
mod scopes;
