#![cfg(test)]

mod audit;
mod discovery;
mod scan;
mod support;
