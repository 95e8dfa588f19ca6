//! Wire types exchanged with the console service.

pub mod http;
