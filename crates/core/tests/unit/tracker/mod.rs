//! In-flight tracker tests.
//!
//! - **Scenarios**: Hand-written event scripts for each stage transition and error path.
//! - **Properties**: Random programs run through the pipeline model.
