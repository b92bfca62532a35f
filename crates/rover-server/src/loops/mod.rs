//! Background loops for continuous processing.

pub mod travel_loop;
