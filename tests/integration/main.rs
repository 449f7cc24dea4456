//! Integration tests for the edge pipeline and the tick stream driver.

mod pipeline;
mod stream;
