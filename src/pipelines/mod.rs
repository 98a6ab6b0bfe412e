//! Render pipelines. There is one: the lit, optionally textured box pipeline.

pub mod scene;
