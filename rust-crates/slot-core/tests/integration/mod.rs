mod admin_flow;
mod persistence;
mod spin_flow;
