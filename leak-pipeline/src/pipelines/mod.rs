pub mod revenue_leaks;
