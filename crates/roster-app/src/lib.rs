// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod annotate;
pub mod bulk;
pub mod forms;
pub mod groups;
pub mod ids;
pub mod model;
pub mod pipeline;
pub mod resize;
pub mod selection;
pub mod state;

pub use annotate::*;
pub use bulk::*;
pub use forms::*;
pub use groups::*;
pub use ids::*;
pub use model::*;
pub use pipeline::*;
pub use resize::*;
pub use selection::*;
pub use state::*;
