#![allow(dead_code)]

pub mod origin;
pub mod socket_guard;
