#![allow(dead_code)]

pub mod market;
