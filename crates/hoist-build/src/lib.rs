//! Source inspection and artifact synthesis for hoist.
//!
//! # Build stage
//!
//! ```text
//! hoist deploy
//!   1. Ecosystem   ── detect::detect_ecosystem()    package.json > requirements.txt/pyproject.toml > *.py > *.js
//!   2. Runtime     ── synth::ensure_runtime_files() manifest + entrypoint, only when absent
//!   3. Port        ── detect::detect_port()         PORT= > listen( > run(host=..., port=
//!   4. Dockerfile  ── synth::ensure_dockerfile()    one template per ecosystem, only when absent
//! ```
//!
//! Every generated file goes through [`synth::write_if_absent`], so a file the
//! user already has is never touched.

pub mod detect;
pub mod dockerfile;
pub mod synth;

pub use detect::{detect_ecosystem, detect_port, inspect};
pub use dockerfile::DockerfileGenerator;
pub use synth::{
    SynthError, SynthOutcome, SynthReport, ensure_dockerfile, ensure_runtime_files, write_if_absent,
};
