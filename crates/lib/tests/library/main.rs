mod common;
mod loader_tests;
